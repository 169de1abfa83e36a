//! The uniform consistent-hash wrapper.
//!
//! Binds an engine to real [`crate::Node`] objects and enforces the
//! membership invariants engines cannot check themselves. Bucket-indexed
//! engines get an [`crate::Indirection`] table; name-indexed engines get a
//! name → Node map.

pub mod bucket;
pub mod name;

pub use bucket::BucketConsistentHash;
pub use name::NameConsistentHash;

use crate::error::{Error, Result};
use crate::node::Node;

/// A cluster view with the uniform public contract, regardless of which
/// engine family backs it.
pub enum ConsistentHash {
    Bucket(BucketConsistentHash),
    Name(NameConsistentHash),
}

impl std::fmt::Debug for ConsistentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsistentHash")
            .field("engine", &self.engine_name())
            .field("node_count", &self.node_count())
            .finish()
    }
}

impl ConsistentHash {
    /// The node responsible for `key`.
    pub fn node_for(&self, key: &str) -> Result<&Node> {
        match self {
            ConsistentHash::Bucket(inner) => inner.node_for(key),
            ConsistentHash::Name(inner) => inner.node_for(key),
        }
    }

    /// Registers every node, failing on the first duplicate.
    pub fn add_nodes(&mut self, nodes: &[Node]) -> Result<()> {
        match self {
            ConsistentHash::Bucket(inner) => inner.add_nodes(nodes),
            ConsistentHash::Name(inner) => inner.add_nodes(nodes),
        }
    }

    /// Unregisters every node, failing on the first unknown one.
    pub fn remove_nodes(&mut self, nodes: &[Node]) -> Result<()> {
        match self {
            ConsistentHash::Bucket(inner) => inner.remove_nodes(nodes),
            ConsistentHash::Name(inner) => inner.remove_nodes(nodes),
        }
    }

    /// Number of registered nodes.
    pub fn node_count(&self) -> usize {
        match self {
            ConsistentHash::Bucket(inner) => inner.node_count(),
            ConsistentHash::Name(inner) => inner.node_count(),
        }
    }

    /// Whether any node may be removed, or only the most recently added one.
    pub fn supports_random_removals(&self) -> bool {
        match self {
            ConsistentHash::Bucket(inner) => inner.supports_random_removals(),
            ConsistentHash::Name(_) => true,
        }
    }

    /// The underlying engine's name, for reporting.
    pub fn engine_name(&self) -> &'static str {
        match self {
            ConsistentHash::Bucket(inner) => inner.engine().name(),
            ConsistentHash::Name(inner) => inner.engine().name(),
        }
    }

    /// Raw bucket-indexed engine handle, when that family backs the cluster.
    pub fn bucket_engine(&self) -> Option<&dyn crate::engine::BucketEngine> {
        match self {
            ConsistentHash::Bucket(inner) => Some(inner.engine()),
            ConsistentHash::Name(_) => None,
        }
    }

    /// Raw name-indexed engine handle, when that family backs the cluster.
    pub fn name_engine(&self) -> Option<&dyn crate::engine::NameEngine> {
        match self {
            ConsistentHash::Bucket(_) => None,
            ConsistentHash::Name(inner) => Some(inner.engine()),
        }
    }
}

/// Construction-time validation shared by both wrapper flavors: the initial
/// node set must be non-empty and free of duplicates.
pub(crate) fn validate_initial_nodes(nodes: &[Node]) -> Result<()> {
    if nodes.is_empty() {
        return Err(Error::Precondition(
            "initial node set must not be empty".to_string(),
        ));
    }
    let mut seen = std::collections::HashSet::with_capacity(nodes.len());
    for node in nodes {
        if !seen.insert(node.name()) {
            return Err(Error::DuplicateNode(node.name().to_string()));
        }
    }
    Ok(())
}
