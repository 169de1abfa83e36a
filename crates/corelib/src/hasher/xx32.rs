//! XXHash-32 hash function implementation.

use xxhash_rust::xxh32::xxh32;

use crate::hasher::traits::HashFunction;

/// 32-bit xxHash, zero-extended to the 64-bit contract.
#[derive(Clone, Copy, Debug, Default)]
pub struct Xx32Hash;

impl HashFunction for Xx32Hash {
    fn hash(&self, bytes: &[u8]) -> i64 {
        xxh32(bytes, 0) as i64
    }

    fn name(&self) -> &'static str {
        "xx32"
    }
}
