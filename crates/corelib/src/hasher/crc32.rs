//! CRC32 hash function implementation.

use parking_lot::Mutex;

use crate::hasher::traits::HashFunction;

/// CRC32 hash backed by a reusable streaming digest.
///
/// The digest is mutable scratch state, so `hash` runs under a mutex: without
/// it, concurrent callers could interleave `reset`/`update` sequences and
/// produce garbage values.
pub struct Crc32Hash {
    digest: Mutex<crc32fast::Hasher>,
}

impl Crc32Hash {
    pub fn new() -> Self {
        Self {
            digest: Mutex::new(crc32fast::Hasher::new()),
        }
    }
}

impl Default for Crc32Hash {
    fn default() -> Self {
        Self::new()
    }
}

impl HashFunction for Crc32Hash {
    fn hash(&self, bytes: &[u8]) -> i64 {
        let mut digest = self.digest.lock();
        digest.reset();
        digest.update(bytes);
        digest.clone().finalize() as i64
    }

    fn name(&self) -> &'static str {
        "crc32"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_one_shot_crc() {
        let h = Crc32Hash::new();
        assert_eq!(h.hash(b"hello"), crc32fast::hash(b"hello") as i64);
        // The digest resets between calls.
        assert_eq!(h.hash(b"hello"), crc32fast::hash(b"hello") as i64);
    }
}
