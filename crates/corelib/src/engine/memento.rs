//! Memento consistent hash engine.
//!
//! MementoHash extends the jump recurrence with random removals. Lookups
//! jump into `[0, b_array_size)`; a key landing on a removed bucket rehashes
//! into the working set as it stood right after that removal, whose size the
//! memento remembers. The remembered size does double duty as a bucket
//! index: a rehash landing on a bucket that was already gone at that point
//! forwards to the bucket standing in for it, which is exactly the
//! remembered-size index. With no removals outstanding the engine degenerates
//! to plain jump.

use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::jump::jump_hash;
use crate::engine::traits::BucketEngine;
use crate::error::{Error, Result};
use crate::hasher::HashFunction;

#[derive(Clone, Copy, Debug)]
struct Replacement {
    /// Working-set size right after the removal; also the index of the
    /// bucket that stands in for the removed one.
    replacer: usize,
    /// Bucket removed just before this one, for LIFO restoration.
    previous: Option<usize>,
}

/// MementoHash engine with random-removal support.
pub struct MementoEngine {
    hash: Arc<dyn HashFunction>,
    replacements: HashMap<usize, Replacement>,
    last_removed: Option<usize>,
    /// Range fed to the jump base hash.
    b_array_size: usize,
    size: usize,
}

impl MementoEngine {
    pub fn new(hash: Arc<dyn HashFunction>, initial_size: usize) -> Self {
        Self {
            hash,
            replacements: HashMap::new(),
            last_removed: None,
            b_array_size: initial_size,
            size: initial_size,
        }
    }

    fn replacer(&self, bucket: usize) -> Option<usize> {
        self.replacements.get(&bucket).map(|r| r.replacer)
    }
}

impl BucketEngine for MementoEngine {
    fn bucket(&self, key: &str) -> Result<usize> {
        if self.size == 0 {
            return Err(Error::EmptyCluster);
        }
        let key_hash = self.hash.hash_str(key) as u64;
        let mut bucket = jump_hash(key_hash, self.b_array_size);
        while let Some(threshold) = self.replacer(bucket) {
            let draw = self.hash.hash_u64_seed(key_hash, bucket as u32) as u64;
            let mut candidate = (draw % threshold as u64) as usize;
            // Forward past buckets that were already removed at that time.
            while let Some(r) = self.replacer(candidate) {
                if r < threshold {
                    break;
                }
                candidate = r;
            }
            bucket = candidate;
        }
        Ok(bucket)
    }

    fn add_bucket(&mut self) -> Result<usize> {
        let bucket = match self.last_removed {
            // Restore the most recently removed bucket.
            Some(bucket) => {
                let entry = self.replacements.remove(&bucket).ok_or_else(|| {
                    Error::Precondition("memento restore chain out of sync".to_string())
                })?;
                self.last_removed = entry.previous;
                bucket
            }
            // Nothing to restore: extend the jump range at the top.
            None => {
                self.b_array_size += 1;
                self.b_array_size - 1
            }
        };
        self.size += 1;
        Ok(bucket)
    }

    fn remove_bucket(&mut self, bucket: usize) -> Result<usize> {
        if bucket >= self.b_array_size || self.replacements.contains_key(&bucket) {
            return Err(Error::InvalidBucket {
                bucket,
                capacity: self.b_array_size,
            });
        }
        if self.size == 1 {
            return Err(Error::Precondition(
                "cannot remove the last working bucket".to_string(),
            ));
        }
        if self.replacements.is_empty() && bucket == self.b_array_size - 1 {
            // Top bucket with no replacements outstanding: plain jump shrink.
            self.b_array_size -= 1;
            self.size -= 1;
            return Ok(bucket);
        }
        self.size -= 1;
        self.replacements.insert(
            bucket,
            Replacement {
                replacer: self.size,
                previous: self.last_removed,
            },
        );
        self.last_removed = Some(bucket);
        Ok(bucket)
    }

    fn size(&self) -> usize {
        self.size
    }

    fn capacity(&self) -> usize {
        self.b_array_size
    }

    fn supports_random_removals(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "memento"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::Xx32Hash;

    fn engine(size: usize) -> MementoEngine {
        MementoEngine::new(Arc::new(Xx32Hash), size)
    }

    #[test]
    fn degenerates_to_jump_without_removals() {
        let e = engine(7);
        for i in 0..500 {
            let key = format!("key-{}", i);
            let expected = jump_hash(Xx32Hash.hash_str(&key) as u64, 7);
            assert_eq!(e.bucket(&key).unwrap(), expected);
        }
    }

    #[test]
    fn top_removal_with_empty_memento_shrinks_the_range() {
        let mut e = engine(5);
        e.remove_bucket(4).unwrap();
        assert_eq!(e.capacity(), 4);
        assert!(e.replacements.is_empty());
        // A later random removal leaves the range alone.
        e.remove_bucket(1).unwrap();
        assert_eq!(e.capacity(), 4);
        assert_eq!(e.size(), 3);
    }

    #[test]
    fn lookups_avoid_removed_buckets() {
        let mut e = engine(8);
        e.remove_bucket(2).unwrap();
        e.remove_bucket(5).unwrap();
        e.remove_bucket(7).unwrap();
        for i in 0..3000 {
            let b = e.bucket(&format!("key-{}", i)).unwrap();
            assert!(b < 8 && b != 2 && b != 5 && b != 7, "landed on {}", b);
        }
    }

    #[test]
    fn restore_is_lifo_and_round_trips() {
        let mut e = engine(6);
        let before: Vec<usize> = (0..300)
            .map(|i| e.bucket(&format!("k{}", i)).unwrap())
            .collect();
        e.remove_bucket(1).unwrap();
        e.remove_bucket(4).unwrap();
        assert_eq!(e.add_bucket().unwrap(), 4);
        assert_eq!(e.add_bucket().unwrap(), 1);
        let after: Vec<usize> = (0..300)
            .map(|i| e.bucket(&format!("k{}", i)).unwrap())
            .collect();
        assert_eq!(before, after);
    }
}
