//! Pluggable hash functions for the algorithm engines.
//!
//! Engines never hash bytes themselves; they go through the [`HashFunction`]
//! contract so every algorithm can be benchmarked against every digest.

pub mod crc32;
pub mod md5;
pub mod murmur3;
pub mod traits;
pub mod xx32;

pub use crc32::Crc32Hash;
pub use md5::Md5Hash;
pub use murmur3::Murmur3Hash;
pub use traits::{HashAlgorithm, HashFunction};
pub use xx32::Xx32Hash;
