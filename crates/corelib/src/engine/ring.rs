//! Token-ring engine with virtual nodes.
//!
//! Each physical node is projected onto the ring as `v_node_count` virtual
//! nodes so load smooths out across members. Lookups hash the key and take
//! the first virtual node at or past that token, wrapping to the ring's
//! start when none is.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::engine::traits::NameEngine;
use crate::error::{Error, Result};
use crate::hasher::HashFunction;

/// Seed for rehashing a colliding virtual-node token.
const COLLISION_SEED: u32 = 0x5A;

/// One ring position owned by a physical node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VirtualNode {
    token: u64,
    physical: String,
    index: usize,
}

impl VirtualNode {
    pub fn token(&self) -> u64 {
        self.token
    }

    /// Name of the owning physical node.
    pub fn physical(&self) -> &str {
        &self.physical
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// Sorted-map ring over virtual-node tokens.
pub struct RingEngine {
    hash: Arc<dyn HashFunction>,
    v_node_count: usize,
    ring: BTreeMap<u64, String>,
    /// Physical node -> its ring tokens, for removal.
    positions: HashMap<String, Vec<u64>>,
}

impl RingEngine {
    pub fn new(hash: Arc<dyn HashFunction>, v_node_count: usize) -> Result<Self> {
        if v_node_count == 0 {
            return Err(Error::Precondition(
                "virtual node count must be positive".to_string(),
            ));
        }
        Ok(Self {
            hash,
            v_node_count,
            ring: BTreeMap::new(),
            positions: HashMap::new(),
        })
    }

    /// Adds a physical node, returning the virtual nodes placed for it.
    pub fn add_node(&mut self, name: &str) -> Result<Vec<VirtualNode>> {
        if self.positions.contains_key(name) {
            return Err(Error::DuplicateNode(name.to_string()));
        }
        let mut vnodes = Vec::with_capacity(self.v_node_count);
        let mut tokens = Vec::with_capacity(self.v_node_count);
        for index in 0..self.v_node_count {
            let mut token = self.hash.hash_str_seed(name, index as u32) as u64;
            // Tokens must be unique on the ring; rehash until free.
            while self.ring.contains_key(&token) || tokens.contains(&token) {
                token = self.hash.hash_u64_seed(token, COLLISION_SEED) as u64;
            }
            tokens.push(token);
            vnodes.push(VirtualNode {
                token,
                physical: name.to_string(),
                index,
            });
        }
        for &token in &tokens {
            self.ring.insert(token, name.to_string());
        }
        self.positions.insert(name.to_string(), tokens);
        tracing::debug!(node = name, vnodes = self.v_node_count, "ring node added");
        Ok(vnodes)
    }

    /// First virtual node at or past the key's token, wrapping around.
    fn owner(&self, token: u64) -> Option<&str> {
        self.ring
            .range(token..)
            .next()
            .or_else(|| self.ring.iter().next())
            .map(|(_, name)| name.as_str())
    }
}

impl NameEngine for RingEngine {
    fn resource(&self, key: &str) -> Result<&str> {
        if self.ring.is_empty() {
            return Err(Error::EmptyCluster);
        }
        let token = self.hash.hash_str(key) as u64;
        self.owner(token).ok_or(Error::EmptyCluster)
    }

    fn add_resource(&mut self, name: &str) -> Result<()> {
        self.add_node(name).map(|_| ())
    }

    fn remove_resource(&mut self, name: &str) -> Result<()> {
        let tokens = self
            .positions
            .remove(name)
            .ok_or_else(|| Error::NodeNotFound(name.to_string()))?;
        for token in tokens {
            self.ring.remove(&token);
        }
        Ok(())
    }

    fn size(&self) -> usize {
        self.positions.len()
    }

    fn name(&self) -> &'static str {
        "ring"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::Xx32Hash;

    fn engine(vnodes: usize) -> RingEngine {
        RingEngine::new(Arc::new(Xx32Hash), vnodes).unwrap()
    }

    #[test]
    fn add_node_places_exactly_v_virtual_nodes() {
        let mut e = engine(16);
        let vnodes = e.add_node("p").unwrap();
        assert_eq!(vnodes.len(), 16);
        assert!(vnodes.iter().all(|v| v.physical() == "p"));
        // All tokens are distinct ring positions.
        let mut tokens: Vec<u64> = vnodes.iter().map(|v| v.token()).collect();
        tokens.sort_unstable();
        tokens.dedup();
        assert_eq!(tokens.len(), 16);
    }

    #[test]
    fn lookup_wraps_around_the_ring() {
        let mut e = engine(4);
        e.add_node("a").unwrap();
        e.add_node("b").unwrap();
        for i in 0..500 {
            let owner = e.resource(&format!("key-{}", i)).unwrap();
            assert!(owner == "a" || owner == "b");
        }
    }

    #[test]
    fn removing_a_node_clears_all_its_positions() {
        let mut e = engine(8);
        e.add_node("a").unwrap();
        e.add_node("b").unwrap();
        e.remove_resource("a").unwrap();
        assert_eq!(e.size(), 1);
        for i in 0..200 {
            assert_eq!(e.resource(&format!("key-{}", i)).unwrap(), "b");
        }
        e.remove_resource("b").unwrap();
        assert!(matches!(e.resource("k"), Err(Error::EmptyCluster)));
    }
}
