//! Anchor consistent hash engine.
//!
//! AnchorHash over a fixed anchor of `capacity` buckets. Four parallel arrays
//! carry the bookkeeping: `a` holds each bucket's removal generation (0 while
//! working, otherwise the working-set size right after the removal), `w`
//! lists the working set, `l` tracks each bucket's position in `w`, and `k`
//! points at the bucket that replaced a removed one. Lookups land anywhere in
//! the anchor and chase removal generations downward until they hit a
//! working bucket; any bucket may be removed, and removed buckets are
//! restored in LIFO order.

use std::sync::Arc;

use crate::engine::traits::BucketEngine;
use crate::error::{Error, Result};
use crate::hasher::HashFunction;

/// AnchorHash engine with random-removal support.
pub struct AnchorEngine {
    hash: Arc<dyn HashFunction>,
    /// Removal generation; 0 marks a working bucket.
    a: Vec<u32>,
    /// Working-set membership list.
    w: Vec<u32>,
    /// Last known position of each bucket inside `w`.
    l: Vec<u32>,
    /// Replacement pointer chased by lookups.
    k: Vec<u32>,
    /// LIFO of removed buckets awaiting restoration.
    stack: Vec<u32>,
    size: usize,
    capacity: usize,
}

impl AnchorEngine {
    /// Creates an anchor of `capacity` buckets with the first `initial_size`
    /// of them working.
    pub fn new(
        hash: Arc<dyn HashFunction>,
        capacity: usize,
        initial_size: usize,
    ) -> Result<Self> {
        if capacity == 0 || capacity > u32::MAX as usize {
            return Err(Error::Precondition(format!(
                "anchor capacity {} out of range",
                capacity
            )));
        }
        if initial_size == 0 || initial_size > capacity {
            return Err(Error::Precondition(format!(
                "initial size {} must be in 1..={}",
                initial_size, capacity
            )));
        }
        let mut engine = Self {
            hash,
            a: vec![0; capacity],
            w: (0..capacity as u32).collect(),
            l: (0..capacity as u32).collect(),
            k: (0..capacity as u32).collect(),
            stack: Vec::new(),
            size: capacity,
            capacity,
        };
        // Retire the top of the anchor down to the initial working set; these
        // removals are contiguous at the top, so none of them hits the stack
        // and `add_bucket` recovers them by extension.
        for bucket in (initial_size..capacity).rev() {
            engine.retire(bucket);
        }
        Ok(engine)
    }

    fn retire(&mut self, bucket: usize) {
        self.size -= 1;
        let top = self.size;
        if !(self.stack.is_empty() && bucket == top) {
            self.stack.push(bucket as u32);
        }
        self.a[bucket] = top as u32;
        self.w[self.l[bucket] as usize] = self.w[top];
        self.l[self.w[top] as usize] = self.l[bucket];
        self.k[bucket] = self.w[top];
    }
}

impl BucketEngine for AnchorEngine {
    fn bucket(&self, key: &str) -> Result<usize> {
        if self.size == 0 {
            return Err(Error::EmptyCluster);
        }
        let key_hash = self.hash.hash_str(key) as u64;
        let mut bucket = (key_hash % self.capacity as u64) as usize;
        while self.a[bucket] != 0 {
            // Rehash into the working set as it stood when `bucket` was
            // removed, then chase replacements made since.
            let draw = self.hash.hash_u64_seed(key_hash, bucket as u32) as u64;
            let mut candidate = (draw % self.a[bucket] as u64) as usize;
            while self.a[candidate] >= self.a[bucket] {
                candidate = self.k[candidate] as usize;
            }
            bucket = candidate;
        }
        Ok(bucket)
    }

    fn add_bucket(&mut self) -> Result<usize> {
        if self.size == self.capacity {
            return Err(Error::CapacityExhausted {
                capacity: self.capacity,
            });
        }
        let bucket = match self.stack.pop() {
            Some(b) => b as usize,
            None => self.size,
        };
        let top = self.size;
        self.a[bucket] = 0;
        self.l[self.w[top] as usize] = top as u32;
        self.w[self.l[bucket] as usize] = bucket as u32;
        self.k[bucket] = bucket as u32;
        self.size += 1;
        Ok(bucket)
    }

    fn remove_bucket(&mut self, bucket: usize) -> Result<usize> {
        if bucket >= self.capacity || self.a[bucket] != 0 {
            return Err(Error::InvalidBucket {
                bucket,
                capacity: self.capacity,
            });
        }
        if self.size == 1 {
            // The removal generation of the last bucket would collide with
            // the working marker; an anchor never empties.
            return Err(Error::Precondition(
                "cannot remove the last working bucket".to_string(),
            ));
        }
        self.retire(bucket);
        Ok(bucket)
    }

    fn size(&self) -> usize {
        self.size
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn supports_random_removals(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "anchor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::Xx32Hash;

    fn engine(size: usize, capacity: usize) -> AnchorEngine {
        AnchorEngine::new(Arc::new(Xx32Hash), capacity, size).unwrap()
    }

    #[test]
    fn single_bucket_funnels_every_key() {
        let e = engine(1, 10);
        for i in 0..150 {
            assert_eq!(e.bucket(&format!("any_string_{}", i)).unwrap(), 0);
        }
    }

    #[test]
    fn add_extends_at_the_working_set_boundary() {
        let mut e = engine(4, 10);
        assert_eq!(e.add_bucket().unwrap(), 4);
        assert_eq!(e.size(), 5);
    }

    #[test]
    fn removed_buckets_are_restored_lifo() {
        let mut e = engine(6, 12);
        e.remove_bucket(2).unwrap();
        e.remove_bucket(4).unwrap();
        assert_eq!(e.add_bucket().unwrap(), 4);
        assert_eq!(e.add_bucket().unwrap(), 2);
        assert_eq!(e.add_bucket().unwrap(), 6);
        assert_eq!(e.size(), 7);
    }

    #[test]
    fn lookups_avoid_removed_buckets() {
        let mut e = engine(8, 16);
        e.remove_bucket(3).unwrap();
        e.remove_bucket(0).unwrap();
        for i in 0..2000 {
            let b = e.bucket(&format!("key-{}", i)).unwrap();
            assert!(b != 3 && b != 0 && b < 8, "landed on {}", b);
        }
    }

    #[test]
    fn capacity_is_enforced() {
        let mut e = engine(3, 3);
        assert!(matches!(
            e.add_bucket(),
            Err(Error::CapacityExhausted { capacity: 3 })
        ));
        e.remove_bucket(1).unwrap();
        assert_eq!(e.add_bucket().unwrap(), 1);
    }
}
