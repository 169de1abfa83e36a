//! Rendezvous (highest random weight) engine.

use std::sync::Arc;

use crate::engine::traits::NameEngine;
use crate::error::{Error, Result};
use crate::hasher::HashFunction;

/// Rendezvous hashing: every lookup scans all resources and the highest
/// `hash(key + name)` wins. The resource list is kept sorted by name so the
/// scan order, and therefore tie-breaking, is deterministic: on equal
/// hashes the lexicographically first name is kept.
pub struct RendezvousEngine {
    hash: Arc<dyn HashFunction>,
    resources: Vec<String>,
}

impl RendezvousEngine {
    pub fn new(hash: Arc<dyn HashFunction>) -> Self {
        Self {
            hash,
            resources: Vec::new(),
        }
    }
}

impl NameEngine for RendezvousEngine {
    fn resource(&self, key: &str) -> Result<&str> {
        let mut winner: Option<(&str, i64)> = None;
        for name in &self.resources {
            let score = self.hash.hash_str(&format!("{}{}", key, name));
            match winner {
                Some((_, best)) if score <= best => {}
                _ => winner = Some((name, score)),
            }
        }
        winner.map(|(name, _)| name).ok_or(Error::EmptyCluster)
    }

    fn add_resource(&mut self, name: &str) -> Result<()> {
        match self.resources.binary_search_by(|r| r.as_str().cmp(name)) {
            Ok(_) => Err(Error::DuplicateNode(name.to_string())),
            Err(at) => {
                self.resources.insert(at, name.to_string());
                Ok(())
            }
        }
    }

    fn remove_resource(&mut self, name: &str) -> Result<()> {
        match self.resources.binary_search_by(|r| r.as_str().cmp(name)) {
            Ok(at) => {
                self.resources.remove(at);
                Ok(())
            }
            Err(_) => Err(Error::NodeNotFound(name.to_string())),
        }
    }

    fn size(&self) -> usize {
        self.resources.len()
    }

    fn name(&self) -> &'static str {
        "rendezvous"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::Xx32Hash;

    fn engine(names: &[&str]) -> RendezvousEngine {
        let mut e = RendezvousEngine::new(Arc::new(Xx32Hash));
        for name in names {
            e.add_resource(name).unwrap();
        }
        e
    }

    #[test]
    fn single_resource_funnels_every_key() {
        let e = engine(&["only"]);
        for i in 0..120 {
            assert_eq!(e.resource(&format!("key-{}", i)).unwrap(), "only");
        }
    }

    #[test]
    fn removal_only_moves_the_removed_resources_keys() {
        let mut e = engine(&["a", "b", "c", "d"]);
        let before: Vec<String> = (0..1000)
            .map(|i| e.resource(&format!("k{}", i)).unwrap().to_string())
            .collect();
        e.remove_resource("c").unwrap();
        for (i, owner) in before.iter().enumerate() {
            let now = e.resource(&format!("k{}", i)).unwrap();
            if owner != "c" {
                assert_eq!(now, owner, "key k{} moved needlessly", i);
            } else {
                assert_ne!(now, "c");
            }
        }
    }

    #[test]
    fn duplicate_add_is_rejected() {
        let mut e = engine(&["a"]);
        assert!(matches!(
            e.add_resource("a"),
            Err(Error::DuplicateNode(_))
        ));
    }
}
