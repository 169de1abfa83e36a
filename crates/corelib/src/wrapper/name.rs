//! Wrapper for name-indexed engines.

use std::collections::HashMap;

use tracing::debug;

use crate::engine::NameEngine;
use crate::error::{Error, Result};
use crate::node::Node;
use crate::wrapper::validate_initial_nodes;

/// Binds a name-indexed engine to nodes through a name → Node map.
///
/// The engine resolves keys to resource names; this wrapper owns the mapping
/// back to the actual [`Node`] values.
pub struct NameConsistentHash {
    engine: Box<dyn NameEngine>,
    nodes: HashMap<String, Node>,
}

impl NameConsistentHash {
    /// Wraps an empty `engine` and registers the initial node set.
    pub fn new(engine: Box<dyn NameEngine>, nodes: &[Node]) -> Result<Self> {
        validate_initial_nodes(nodes)?;
        if engine.size() != 0 {
            return Err(Error::Precondition(
                "name engine must start empty".to_string(),
            ));
        }
        let mut wrapper = Self {
            engine,
            nodes: HashMap::with_capacity(nodes.len()),
        };
        wrapper.add_nodes(nodes)?;
        Ok(wrapper)
    }

    pub fn node_for(&self, key: &str) -> Result<&Node> {
        let name = self.engine.resource(key)?;
        self.nodes
            .get(name)
            .ok_or_else(|| Error::NodeNotFound(name.to_string()))
    }

    pub fn add_nodes(&mut self, nodes: &[Node]) -> Result<()> {
        for node in nodes {
            // The engine rejects duplicates before the map is touched.
            self.engine.add_resource(node.name())?;
            self.nodes.insert(node.name().to_string(), node.clone());
            debug!(node = node.name(), "node added");
        }
        Ok(())
    }

    pub fn remove_nodes(&mut self, nodes: &[Node]) -> Result<()> {
        for node in nodes {
            self.engine.remove_resource(node.name())?;
            self.nodes.remove(node.name());
            debug!(node = node.name(), "node removed");
        }
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.engine.size()
    }

    /// Raw engine handle for the benchmark layer.
    pub fn engine(&self) -> &dyn NameEngine {
        self.engine.as_ref()
    }
}
