//! Dx consistent hash engine.
//!
//! DxHash draws a pseudo-random probe sequence over the whole capacity range
//! and returns the first probe that lands on a working bucket. Removed
//! buckets are tracked in a failed bitset plus a LIFO free list for reuse;
//! the capacity only grows (it doubles whenever the working set outgrows
//! it), so probe sequences for surviving buckets never shift.

use std::sync::Arc;

use crate::engine::traits::BucketEngine;
use crate::error::{Error, Result};
use crate::hasher::HashFunction;
use crate::sequence::SplitMix64;

/// DxHash engine with random-removal support.
pub struct DxEngine {
    hash: Arc<dyn HashFunction>,
    /// Failed (removed) buckets, one bit per bucket.
    failed: Vec<u64>,
    /// LIFO of removed bucket indices awaiting reuse.
    free: Vec<usize>,
    size: usize,
    capacity: usize,
}

impl DxEngine {
    pub fn new(
        hash: Arc<dyn HashFunction>,
        capacity: usize,
        initial_size: usize,
    ) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::Precondition("dx capacity must be positive".to_string()));
        }
        if initial_size > capacity {
            return Err(Error::Precondition(format!(
                "initial size {} exceeds capacity {}",
                initial_size, capacity
            )));
        }
        let mut engine = Self {
            hash,
            failed: vec![0; capacity.div_ceil(64)],
            free: Vec::new(),
            size: initial_size,
            capacity,
        };
        for bucket in (initial_size..capacity).rev() {
            engine.set_failed(bucket, true);
            engine.free.push(bucket);
        }
        Ok(engine)
    }

    fn is_failed(&self, bucket: usize) -> bool {
        self.failed[bucket / 64] & (1 << (bucket % 64)) != 0
    }

    fn set_failed(&mut self, bucket: usize, failed: bool) {
        if failed {
            self.failed[bucket / 64] |= 1 << (bucket % 64);
        } else {
            self.failed[bucket / 64] &= !(1 << (bucket % 64));
        }
    }
}

impl BucketEngine for DxEngine {
    fn bucket(&self, key: &str) -> Result<usize> {
        if self.size == 0 {
            return Err(Error::EmptyCluster);
        }
        let mut stream = SplitMix64::new(self.hash.hash_str(key) as u64);
        loop {
            let bucket = stream.next_bounded(self.capacity as u64) as usize;
            if !self.is_failed(bucket) {
                return Ok(bucket);
            }
        }
    }

    fn add_bucket(&mut self) -> Result<usize> {
        if let Some(bucket) = self.free.pop() {
            self.set_failed(bucket, false);
            self.size += 1;
            return Ok(bucket);
        }
        // Working set outgrew the range: double it. The old range keeps its
        // probe semantics, the new upper half starts failed except for the
        // bucket being handed out.
        let old = self.capacity;
        self.capacity = old * 2;
        self.failed.resize(self.capacity.div_ceil(64), 0);
        for bucket in (old + 1..self.capacity).rev() {
            self.set_failed(bucket, true);
            self.free.push(bucket);
        }
        self.size += 1;
        tracing::debug!(capacity = self.capacity, "dx range doubled");
        Ok(old)
    }

    fn remove_bucket(&mut self, bucket: usize) -> Result<usize> {
        if bucket >= self.capacity || self.is_failed(bucket) {
            return Err(Error::InvalidBucket {
                bucket,
                capacity: self.capacity,
            });
        }
        self.set_failed(bucket, true);
        self.free.push(bucket);
        self.size -= 1;
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
        "dx"
    }
}
