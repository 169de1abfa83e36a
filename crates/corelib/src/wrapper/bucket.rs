//! Wrapper for bucket-indexed engines.

use tracing::debug;

use crate::engine::BucketEngine;
use crate::error::{Error, Result};
use crate::indirection::Indirection;
use crate::node::Node;
use crate::wrapper::validate_initial_nodes;

/// Binds a bucket-indexed engine to nodes through an [`Indirection`] table.
///
/// The engine is the authority on which bucket serves a key; the table is
/// the authority on which node owns a bucket. This wrapper keeps the two in
/// lock step across membership changes.
pub struct BucketConsistentHash {
    engine: Box<dyn BucketEngine>,
    indirection: Indirection,
}

impl BucketConsistentHash {
    /// Wraps `engine`, which must already hold one working bucket per
    /// initial node; node `i` is bound to bucket `i`.
    pub fn new(engine: Box<dyn BucketEngine>, nodes: &[Node]) -> Result<Self> {
        validate_initial_nodes(nodes)?;
        if engine.size() != nodes.len() {
            return Err(Error::Precondition(format!(
                "engine holds {} working buckets for {} initial nodes",
                engine.size(),
                nodes.len()
            )));
        }
        let mut indirection = Indirection::with_capacity_hint(nodes.len());
        for (bucket, node) in nodes.iter().enumerate() {
            indirection.put(node.clone(), bucket)?;
        }
        Ok(Self {
            engine,
            indirection,
        })
    }

    pub fn node_for(&self, key: &str) -> Result<&Node> {
        let bucket = self.engine.bucket(key)?;
        self.indirection.node(bucket)
    }

    pub fn add_nodes(&mut self, nodes: &[Node]) -> Result<()> {
        for node in nodes {
            let bucket = self.engine.add_bucket()?;
            if let Err(err) = self.indirection.put(node.clone(), bucket) {
                // The bucket was allocated for a node that cannot be bound;
                // give it back so the failure leaves no trace.
                self.engine.remove_bucket(bucket)?;
                return Err(err);
            }
            debug!(node = node.name(), bucket, "node added");
        }
        Ok(())
    }

    pub fn remove_nodes(&mut self, nodes: &[Node]) -> Result<()> {
        for node in nodes {
            let bucket = self.indirection.bucket(node)?;
            if !self.engine.supports_random_removals() && bucket != self.engine.size() - 1 {
                return Err(Error::NonTopRemoval {
                    bucket,
                    size: self.engine.size(),
                });
            }
            self.engine.remove_bucket(bucket)?;
            self.indirection.remove_node(node)?;
            debug!(node = node.name(), bucket, "node removed");
        }
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.engine.size()
    }

    pub fn supports_random_removals(&self) -> bool {
        self.engine.supports_random_removals()
    }

    /// Raw engine handle for the benchmark layer.
    pub fn engine(&self) -> &dyn BucketEngine {
        self.engine.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine::{AnchorEngine, JumpEngine};
    use crate::hasher::Xx32Hash;

    fn nodes(names: &[&str]) -> Vec<Node> {
        names.iter().map(|n| Node::new(*n)).collect()
    }

    fn anchor_cluster(names: &[&str]) -> BucketConsistentHash {
        let engine =
            AnchorEngine::new(Arc::new(Xx32Hash), names.len() * 4, names.len()).unwrap();
        BucketConsistentHash::new(Box::new(engine), &nodes(names)).unwrap()
    }

    #[test]
    fn duplicate_add_rolls_back_the_bucket() {
        let mut cluster = anchor_cluster(&["a", "b"]);
        let err = cluster.add_nodes(&nodes(&["a"])).unwrap_err();
        assert!(matches!(err, Error::DuplicateNode(_)));
        // Engine and table stayed in step.
        assert_eq!(cluster.node_count(), 2);
        assert_eq!(cluster.engine().size(), 2);
    }

    #[test]
    fn non_top_removal_is_rejected_for_jump() {
        let engine = JumpEngine::new(Arc::new(Xx32Hash), 3);
        let mut cluster =
            BucketConsistentHash::new(Box::new(engine), &nodes(&["a", "b", "c"])).unwrap();
        let err = cluster.remove_nodes(&nodes(&["a"])).unwrap_err();
        assert!(matches!(err, Error::NonTopRemoval { bucket: 0, size: 3 }));
        // The top node goes through.
        cluster.remove_nodes(&nodes(&["c"])).unwrap();
        assert_eq!(cluster.node_count(), 2);
    }

    #[test]
    fn lookups_resolve_through_the_indirection() {
        let cluster = anchor_cluster(&["a", "b", "c"]);
        for i in 0..300 {
            let node = cluster.node_for(&format!("key-{}", i)).unwrap();
            assert!(["a", "b", "c"].contains(&node.name()));
        }
    }
}
