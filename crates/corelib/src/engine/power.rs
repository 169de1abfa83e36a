//! Power consistent hash engine.
//!
//! Same power-of-two frame as the flip engine (nested bit-masked level
//! draw, dead-zone resampling, flip-back to the masked lower half), but the
//! resample draws come from a SplitMix64 stream seeded per (key, level)
//! rather than from indexed rehashing, so the two engines produce different
//! assignments while honoring the same grow/shrink guarantees.

use std::sync::Arc;

use crate::engine::traits::BucketEngine;
use crate::error::{Error, Result};
use crate::hasher::HashFunction;
use crate::sequence::SplitMix64;

/// Each draw terminates with probability above 1/2; this bound is never
/// reached in practice and only caps the loop.
const MAX_DRAWS: u32 = 128;

/// Power engine: size-driven, append/remove-at-top only.
pub struct PowerEngine {
    hash: Arc<dyn HashFunction>,
    size: usize,
}

impl PowerEngine {
    pub fn new(hash: Arc<dyn HashFunction>, initial_size: usize) -> Self {
        Self {
            hash,
            size: initial_size,
        }
    }

    fn power(&self, key_hash: u64, buckets: usize) -> usize {
        if buckets <= 1 {
            return 0;
        }
        let m = (buckets as u64).next_power_of_two();
        let mask = m - 1;
        let x = key_hash & mask;
        if x < buckets as u64 {
            return x as usize;
        }
        let half = m >> 1;
        let level = m.trailing_zeros() as u64;
        let mut stream = SplitMix64::new(key_hash ^ (level + 1).wrapping_mul(0x9E3779B97F4A7C15));
        for _ in 0..MAX_DRAWS {
            let y = stream.next_u64() & mask;
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

impl BucketEngine for PowerEngine {
    fn bucket(&self, key: &str) -> Result<usize> {
        if self.size == 0 {
            return Err(Error::EmptyCluster);
        }
        Ok(self.power(self.hash.hash_str(key) as u64, self.size))
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
        "power"
    }
}
