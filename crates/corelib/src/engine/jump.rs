//! Jump consistent hash engine.

use std::sync::Arc;

use crate::engine::traits::BucketEngine;
use crate::error::{Error, Result};
use crate::hasher::HashFunction;

/// The classic jump consistent hash recurrence.
///
/// Stateless besides the bucket count: `add_bucket`/`remove_bucket` only move
/// `size` by one, and only the last-inserted bucket may be removed.
pub struct JumpEngine {
    hash: Arc<dyn HashFunction>,
    size: usize,
}

/// Lamping & Veach's closed-form recurrence over the key hash.
pub(crate) fn jump_hash(mut key: u64, buckets: usize) -> usize {
    let mut b: i64 = -1;
    let mut j: i64 = 0;
    while j < buckets as i64 {
        b = j;
        key = key.wrapping_mul(2862933555777941757).wrapping_add(1);
        j = (((b + 1) as f64) * ((1u64 << 31) as f64 / ((key >> 33) + 1) as f64)) as i64;
    }
    b as usize
}

impl JumpEngine {
    pub fn new(hash: Arc<dyn HashFunction>, initial_size: usize) -> Self {
        Self {
            hash,
            size: initial_size,
        }
    }
}

impl BucketEngine for JumpEngine {
    fn bucket(&self, key: &str) -> Result<usize> {
        if self.size == 0 {
            return Err(Error::EmptyCluster);
        }
        Ok(jump_hash(self.hash.hash_str(key) as u64, self.size))
    }

    fn add_bucket(&mut self) -> Result<usize> {
        self.size += 1;
        Ok(self.size - 1)
    }

    fn remove_bucket(&mut self, bucket: usize) -> Result<usize> {
        if self.size == 0 {
            return Err(Error::EmptyCluster);
        }
        if bucket != self.size - 1 {
            return Err(Error::NonTopRemoval {
                bucket,
                size: self.size,
            });
        }
        self.size -= 1;
        Ok(bucket)
    }

    fn size(&self) -> usize {
        self.size
    }

    fn capacity(&self) -> usize {
        self.size
    }

    fn name(&self) -> &'static str {
        "jump"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::Xx32Hash;

    #[test]
    fn jump_hash_is_monotone_in_bucket_count() {
        // Growing the range must only move keys onto the new bucket.
        for key in 0..2000u64 {
            let before = jump_hash(key, 7);
            let after = jump_hash(key, 8);
            assert!(after == before || after == 7, "key {} jumped {} -> {}", key, before, after);
        }
    }

    #[test]
    fn only_top_bucket_is_removable() {
        let mut engine = JumpEngine::new(Arc::new(Xx32Hash), 4);
        assert!(matches!(
            engine.remove_bucket(1),
            Err(Error::NonTopRemoval { bucket: 1, size: 4 })
        ));
        assert_eq!(engine.remove_bucket(3).unwrap(), 3);
        assert_eq!(engine.size(), 3);
    }
}
