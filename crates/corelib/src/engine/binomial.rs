//! Binomial consistent hash engine.
//!
//! Represents the working set against the smallest enclosing power-of-two
//! tree and derives a key's in-tree position bit by bit: each tree level
//! contributes one independently hashed bit, so doubling the tree appends a
//! level without disturbing the positions below it. Keys whose position
//! falls in the dead zone `[size, m)` resample like the rest of the family,
//! flipping back to their lower-subtree position when the draw leaves the
//! upper half.

use std::sync::Arc;

use crate::engine::traits::BucketEngine;
use crate::error::{Error, Result};
use crate::hasher::HashFunction;

const MAX_DRAWS: u32 = 64;

/// Seed offset separating resample draws from per-level bit draws.
const RESAMPLE_SEED: u32 = 64;

/// Binomial engine: size-driven, append/remove-at-top only.
pub struct BinomialEngine {
    hash: Arc<dyn HashFunction>,
    size: usize,
}

impl BinomialEngine {
    pub fn new(hash: Arc<dyn HashFunction>, initial_size: usize) -> Self {
        Self {
            hash,
            size: initial_size,
        }
    }

    /// Position within the full binary tree of `levels` levels, one hashed
    /// bit per level, low levels first.
    fn tree_position(&self, key_hash: u64, levels: u32) -> u64 {
        let mut position = 0u64;
        for level in 0..levels {
            let bit = (self.hash.hash_u64_seed(key_hash, level + 1) as u64) & 1;
            position |= bit << level;
        }
        position
    }

    fn binomial(&self, key_hash: u64, buckets: usize) -> usize {
        if buckets <= 1 {
            return 0;
        }
        let m = (buckets as u64).next_power_of_two();
        let levels = m.trailing_zeros();
        let x = self.tree_position(key_hash, levels);
        if x < buckets as u64 {
            return x as usize;
        }
        let half = m >> 1;
        for draw in 1..=MAX_DRAWS {
            let y = (self.hash.hash_u64_index_seed(key_hash, draw, RESAMPLE_SEED + levels) as u64)
                & (m - 1);
            if y < half {
                // The key's position one level down the tree.
                return (x & (half - 1)) as usize;
            }
            if y < buckets as u64 {
                return y as usize;
            }
        }
        (x & (half - 1)) as usize
    }
}

impl BucketEngine for BinomialEngine {
    fn bucket(&self, key: &str) -> Result<usize> {
        if self.size == 0 {
            return Err(Error::EmptyCluster);
        }
        Ok(self.binomial(self.hash.hash_str(key) as u64, self.size))
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
        "binomial"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::Xx32Hash;

    #[test]
    fn tree_positions_nest_across_levels() {
        let e = BinomialEngine::new(Arc::new(Xx32Hash), 1);
        for key in 0..200u64 {
            let low = e.tree_position(key, 3);
            let high = e.tree_position(key, 4);
            assert!(high == low || high == low + 8);
        }
    }

    #[test]
    fn growth_is_strictly_monotone() {
        for n in [2usize, 4, 5, 8, 11, 16] {
            let small = BinomialEngine::new(Arc::new(Xx32Hash), n);
            let big = BinomialEngine::new(Arc::new(Xx32Hash), n + 1);
            for i in 0..1200 {
                let key = format!("key-{}", i);
                let before = small.bucket(&key).unwrap();
                let after = big.bucket(&key).unwrap();
                assert!(after == before || after == n);
            }
        }
    }
}
