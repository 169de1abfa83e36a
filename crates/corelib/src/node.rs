//! Node abstractions for the consistent-hash cluster.
//!
//! Nodes represent logical cluster members. They are identified by a unique,
//! comparable name and carry no other required state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical cluster member, identified by name.
///
/// Keep this struct small and cheap to clone; engines never see it. They work
/// purely in terms of integer buckets or resource-name strings, and the
/// wrapper layer owns the binding between the two.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Node {
    name: String,
}

impl Node {
    /// Construct a new node with the given unique name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The node's unique name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<&str> for Node {
    fn from(name: &str) -> Self {
        Node::new(name)
    }
}
