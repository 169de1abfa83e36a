//! Recall consistent hash engine.
//!
//! Size-driven like the rest of the power-of-two family, but dead-zone keys
//! are resolved by recalling earlier range states: starting from the masked
//! level draw, the key walks a strictly descending rehash chain
//! `x <- H(key, x) mod x`. The chain is independent of the working-set size,
//! so the first chain value inside `[0, size)` is a stable answer; growing
//! the set can only cut the walk short at the newly added bucket. A chain
//! value below the lower half flips the key back to its masked lower-half
//! position, which keeps assignments nested across range doublings.

use std::sync::Arc;

use crate::engine::traits::BucketEngine;
use crate::error::{Error, Result};
use crate::hasher::HashFunction;

/// Recall engine: size-driven, append/remove-at-top only.
pub struct RecallEngine {
    hash: Arc<dyn HashFunction>,
    size: usize,
}

impl RecallEngine {
    pub fn new(hash: Arc<dyn HashFunction>, initial_size: usize) -> Self {
        Self {
            hash,
            size: initial_size,
        }
    }

    fn recall(&self, key_hash: u64, buckets: usize) -> usize {
        if buckets <= 1 {
            return 0;
        }
        let m = (buckets as u64).next_power_of_two();
        let half = m >> 1;
        let start = key_hash & (m - 1);
        if start < buckets as u64 {
            return start as usize;
        }
        // The chain strictly decreases, so it needs no iteration cap.
        let mut x = start;
        loop {
            let draw = (self.hash.hash_u64_seed(key_hash, x as u32) as u64) % x;
            if draw < half {
                return (start & (half - 1)) as usize;
            }
            if draw < buckets as u64 {
                return draw as usize;
            }
            x = draw;
        }
    }
}

impl BucketEngine for RecallEngine {
    fn bucket(&self, key: &str) -> Result<usize> {
        if self.size == 0 {
            return Err(Error::EmptyCluster);
        }
        Ok(self.recall(self.hash.hash_str(key) as u64, self.size))
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
        "recall"
    }
}
