//! Flip consistent hash engine.
//!
//! Keys land in the smallest power-of-two range `[0, m)` enclosing the
//! working set via a bit-masked draw; masking means growing `m` only appends
//! one random top bit, so assignments nest across range doublings. A key
//! whose draw falls in the dead zone `[size, m)` resamples with indexed
//! rehash draws: a draw in the live upper half is accepted, a draw in the
//! lower half flips the key back to its own masked lower-half position.
//! Either way a key can only ever move onto a newly added bucket, never
//! between surviving ones.

use std::sync::Arc;

use crate::engine::traits::BucketEngine;
use crate::error::{Error, Result};
use crate::hasher::HashFunction;

/// Resampling cap; the miss probability halves per draw, so 64 iterations
/// bound the loop without a measurable bias.
const MAX_DRAWS: u32 = 64;

/// Flip engine: size-driven, append/remove-at-top only.
pub struct FlipEngine {
    hash: Arc<dyn HashFunction>,
    size: usize,
}

impl FlipEngine {
    pub fn new(hash: Arc<dyn HashFunction>, initial_size: usize) -> Self {
        Self {
            hash,
            size: initial_size,
        }
    }

    fn flip(&self, key_hash: u64, buckets: usize) -> usize {
        if buckets <= 1 {
            return 0;
        }
        let m = (buckets as u64).next_power_of_two();
        let mask = m - 1;
        let x = key_hash & mask;
        if x < buckets as u64 {
            return x as usize;
        }
        // Dead zone: only non-power-of-two sizes get here.
        let half = m >> 1;
        let level = m.trailing_zeros();
        for draw in 1..=MAX_DRAWS {
            let y = (self.hash.hash_u64_index_seed(key_hash, draw, level) as u64) & mask;
            if y < half {
                return (x & (half - 1)) as usize;
            }
            if y < buckets as u64 {
                return y as usize;
            }
        }
        (x & (half - 1)) as usize
    }
}

impl BucketEngine for FlipEngine {
    fn bucket(&self, key: &str) -> Result<usize> {
        if self.size == 0 {
            return Err(Error::EmptyCluster);
        }
        Ok(self.flip(self.hash.hash_str(key) as u64, self.size))
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
        "flip"
    }
}
