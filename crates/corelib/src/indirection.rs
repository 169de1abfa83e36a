//! Node ↔ bucket indirection layer.
//!
//! Bucket-indexed engines work purely in terms of integers; this table is the
//! single place where the binding between a [`Node`] and its bucket is
//! authoritative. It maintains a strict bijection: a node maps to exactly one
//! bucket and a bucket to exactly one node, always inside `[0, capacity)`.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::node::Node;

/// Strict bijection between nodes and integer buckets.
///
/// Capacity follows the highest mapped bucket: `put` may extend it by exactly
/// one (when binding at the current boundary), and removing the top bucket
/// shrinks it past any trailing unmapped holes.
#[derive(Debug, Default)]
pub struct Indirection {
    node_to_bucket: HashMap<Node, usize>,
    bucket_to_node: HashMap<usize, Node>,
    capacity: usize,
}

impl Indirection {
    /// Creates an empty table. The hint only pre-sizes the maps.
    pub fn with_capacity_hint(hint: usize) -> Self {
        Self {
            node_to_bucket: HashMap::with_capacity(hint),
            bucket_to_node: HashMap::with_capacity(hint),
            capacity: 0,
        }
    }

    /// Binds `node` to `bucket`.
    ///
    /// Fails if either side is already mapped, or if `bucket > capacity`.
    /// Binding at `bucket == capacity` grows the capacity by one.
    pub fn put(&mut self, node: Node, bucket: usize) -> Result<()> {
        if self.node_to_bucket.contains_key(&node) {
            return Err(Error::DuplicateNode(node.name().to_string()));
        }
        if self.bucket_to_node.contains_key(&bucket) {
            return Err(Error::DuplicateBucket(bucket));
        }
        if bucket > self.capacity {
            return Err(Error::InvalidBucket {
                bucket,
                capacity: self.capacity,
            });
        }
        if bucket == self.capacity {
            self.capacity += 1;
        }
        self.node_to_bucket.insert(node.clone(), bucket);
        self.bucket_to_node.insert(bucket, node);
        Ok(())
    }

    /// The bucket bound to `node`.
    pub fn bucket(&self, node: &Node) -> Result<usize> {
        self.node_to_bucket
            .get(node)
            .copied()
            .ok_or_else(|| Error::NodeNotFound(node.name().to_string()))
    }

    /// The node bound to `bucket`.
    pub fn node(&self, bucket: usize) -> Result<&Node> {
        self.bucket_to_node
            .get(&bucket)
            .ok_or(Error::InvalidBucket {
                bucket,
                capacity: self.capacity,
            })
    }

    /// Unbinds `node`, returning its bucket.
    pub fn remove_node(&mut self, node: &Node) -> Result<usize> {
        let bucket = self.bucket(node)?;
        self.node_to_bucket.remove(node);
        self.bucket_to_node.remove(&bucket);
        self.shrink_from(bucket);
        Ok(bucket)
    }

    /// Unbinds `bucket`, returning its node.
    pub fn remove_bucket(&mut self, bucket: usize) -> Result<Node> {
        let node = self
            .bucket_to_node
            .remove(&bucket)
            .ok_or(Error::InvalidBucket {
                bucket,
                capacity: self.capacity,
            })?;
        self.node_to_bucket.remove(&node);
        self.shrink_from(bucket);
        Ok(node)
    }

    /// Number of live bindings.
    pub fn size(&self) -> usize {
        self.node_to_bucket.len()
    }

    /// One past the highest bucket ever still mapped.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Capacity tracks the top mapped bucket: several trailing holes can be
    /// absorbed by a single removal, hence the loop.
    fn shrink_from(&mut self, removed: usize) {
        if removed + 1 == self.capacity {
            while self.capacity > 0 && !self.bucket_to_node.contains_key(&(self.capacity - 1)) {
                self.capacity -= 1;
            }
        }
    }
}
