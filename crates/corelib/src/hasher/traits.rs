//! Core hash function trait definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A keyed 64-bit hash over byte strings.
///
/// The byte-array primitive is the only required method; every overload
/// reduces to it by concatenating the big-endian encoding of each argument
/// before hashing. A seed of `0` is defined to be equivalent to hashing
/// without a seed: no suffix is appended. This is a deliberate special case,
/// not a general "falsy" rule.
///
/// Implementations must be deterministic across process runs: same bytes and
/// seed, same value. Implementations that hold a mutable digest internally
/// must serialize concurrent `hash` calls (see [`crate::hasher::Crc32Hash`]);
/// stateless implementations need no guard.
pub trait HashFunction: Send + Sync {
    /// Hashes a byte string to a non-negative 64-bit value.
    fn hash(&self, bytes: &[u8]) -> i64;

    /// Returns the name of this hash function.
    fn name(&self) -> &'static str;

    /// Hashes a string key.
    fn hash_str(&self, key: &str) -> i64 {
        self.hash(key.as_bytes())
    }

    /// Hashes a string key with a seed suffix.
    fn hash_str_seed(&self, key: &str, seed: u32) -> i64 {
        let mut buf = Vec::with_capacity(key.len() + 4);
        buf.extend_from_slice(key.as_bytes());
        push_seed(&mut buf, seed);
        self.hash(&buf)
    }

    /// Hashes a 64-bit value with a seed suffix.
    fn hash_u64_seed(&self, value: u64, seed: u32) -> i64 {
        let mut buf = Vec::with_capacity(12);
        buf.extend_from_slice(&value.to_be_bytes());
        push_seed(&mut buf, seed);
        self.hash(&buf)
    }

    /// Hashes a 64-bit value together with a draw index and a seed suffix.
    fn hash_u64_index_seed(&self, value: u64, index: u32, seed: u32) -> i64 {
        let mut buf = Vec::with_capacity(16);
        buf.extend_from_slice(&value.to_be_bytes());
        buf.extend_from_slice(&index.to_be_bytes());
        push_seed(&mut buf, seed);
        self.hash(&buf)
    }
}

/// Seed 0 hashes the bare value, so seeded and unseeded calls agree there.
fn push_seed(buf: &mut Vec<u8>, seed: u32) {
    if seed != 0 {
        buf.extend_from_slice(&seed.to_be_bytes());
    }
}

/// Selects one of the provided hash implementations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Crc32,
    Md5,
    Xx32,
    Murmur3,
}

impl HashAlgorithm {
    /// Constructs the selected hash function.
    pub fn build(self) -> Box<dyn HashFunction> {
        match self {
            HashAlgorithm::Crc32 => Box::new(crate::hasher::Crc32Hash::new()),
            HashAlgorithm::Md5 => Box::new(crate::hasher::Md5Hash),
            HashAlgorithm::Xx32 => Box::new(crate::hasher::Xx32Hash),
            HashAlgorithm::Murmur3 => Box::new(crate::hasher::Murmur3Hash),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.to_ascii_lowercase().as_str() {
            "crc32" => Ok(HashAlgorithm::Crc32),
            "md5" => Ok(HashAlgorithm::Md5),
            "xx32" | "xx" => Ok(HashAlgorithm::Xx32),
            "murmur3" | "murmur" => Ok(HashAlgorithm::Murmur3),
            other => Err(Error::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            HashAlgorithm::Crc32 => "crc32",
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Xx32 => "xx32",
            HashAlgorithm::Murmur3 => "murmur3",
        };
        write!(f, "{}", tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Identity;

    impl HashFunction for Identity {
        fn hash(&self, bytes: &[u8]) -> i64 {
            bytes.iter().fold(0i64, |acc, &b| (acc << 8) | b as i64)
        }

        fn name(&self) -> &'static str {
            "identity"
        }
    }

    #[test]
    fn seed_zero_is_unseeded() {
        let h = Identity;
        assert_eq!(h.hash_str_seed("ab", 0), h.hash_str("ab"));
        assert_ne!(h.hash_str_seed("ab", 1), h.hash_str("ab"));
    }

    #[test]
    fn overloads_compose_big_endian() {
        let h = Identity;
        // 7u64 BE then seed 1 BE.
        assert_eq!(
            h.hash_u64_seed(7, 1),
            h.hash(&[0, 0, 0, 0, 0, 0, 0, 7, 0, 0, 0, 1])
        );
        // value, then 4-byte index, then seed omitted when 0.
        assert_eq!(
            h.hash_u64_index_seed(7, 2, 0),
            h.hash(&[0, 0, 0, 0, 0, 0, 0, 7, 0, 0, 0, 2])
        );
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert!(matches!(
            "sha999".parse::<HashAlgorithm>(),
            Err(Error::UnsupportedAlgorithm(_))
        ));
        assert_eq!("XX32".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Xx32);
    }
}
