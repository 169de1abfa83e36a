//! Jump-back consistent hash engine.
//!
//! A drop-in replacement for the jump recurrence that walks power-of-two
//! intervals downward instead of jumping upward. The bucket for `n` working
//! buckets is the largest "active" index below `n`, where the active set is
//! generated per interval `[2^i, 2^(i+1))`: with probability 1/2 the interval
//! holds a largest active index, uniform within the interval, and each
//! further active index below an active `j` is uniform in `[0, j)` (index 0
//! is always active). This makes index `j` active with probability
//! `1/(j + 1)`, which yields a uniform bucket distribution, and growing `n`
//! can only move keys onto the newly activated bucket.

use std::sync::Arc;

use crate::engine::traits::BucketEngine;
use crate::error::{Error, Result};
use crate::hasher::HashFunction;
use crate::sequence::SplitMix64;

/// Jump-back variant: stateless besides `size`, append/remove-at-top only.
pub struct JumpBackEngine {
    hash: Arc<dyn HashFunction>,
    size: usize,
}

fn jump_back(key: u64, buckets: usize) -> usize {
    if buckets <= 1 {
        return 0;
    }
    // Interval containing the largest candidate index, buckets - 1.
    let mut level = 63 - ((buckets - 1) as u64).leading_zeros();
    loop {
        let base = 1u64 << level;
        // One deterministic draw stream per (key, interval).
        let mut stream =
            SplitMix64::new(key ^ (base.wrapping_mul(0x9E3779B97F4A7C15)).rotate_left(17));
        let v = stream.next_u64() & (2 * base - 1);
        if v >= base {
            // v is the interval's largest active index; walk the chain down
            // until it leaves the interval or lands below the working range.
            let mut j = v;
            loop {
                if j < buckets as u64 {
                    return j as usize;
                }
                let next = stream.next_bounded(j);
                if next < base {
                    break;
                }
                j = next;
            }
        }
        if level == 0 {
            return 0;
        }
        level -= 1;
    }
}

impl JumpBackEngine {
    pub fn new(hash: Arc<dyn HashFunction>, initial_size: usize) -> Self {
        Self {
            hash,
            size: initial_size,
        }
    }
}

impl BucketEngine for JumpBackEngine {
    fn bucket(&self, key: &str) -> Result<usize> {
        if self.size == 0 {
            return Err(Error::EmptyCluster);
        }
        Ok(jump_back(self.hash.hash_str(key) as u64, self.size))
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
        "jumpback"
    }
}
