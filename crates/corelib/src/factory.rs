//! Engine selection and construction.
//!
//! The configuration layer outside this crate parses and range-checks user
//! input; what arrives here are plain values. Unknown algorithm tags fail
//! here, before any engine state exists.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::engine::{
    AnchorEngine, BinomialEngine, DxEngine, FlipEngine, JumpBackEngine, JumpEngine, MaglevEngine,
    MementoEngine, MultiProbeEngine, PowerEngine, RecallEngine, RendezvousEngine, RingEngine,
};
use crate::error::{Error, Result};
use crate::hasher::{HashAlgorithm, HashFunction};
use crate::node::Node;
use crate::sequence::Primes;
use crate::wrapper::{BucketConsistentHash, ConsistentHash, NameConsistentHash};

/// Consistent-hash algorithm tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Anchor,
    Dx,
    Jump,
    JumpBack,
    Binomial,
    Flip,
    Power,
    Memento,
    Recall,
    Rendezvous,
    Maglev,
    MultiProbe,
    Ring,
}

impl Algorithm {
    /// All selectable algorithms, in tag order.
    pub const ALL: [Algorithm; 13] = [
        Algorithm::Anchor,
        Algorithm::Dx,
        Algorithm::Jump,
        Algorithm::JumpBack,
        Algorithm::Binomial,
        Algorithm::Flip,
        Algorithm::Power,
        Algorithm::Memento,
        Algorithm::Recall,
        Algorithm::Rendezvous,
        Algorithm::Maglev,
        Algorithm::MultiProbe,
        Algorithm::Ring,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Algorithm::Anchor => "anchor",
            Algorithm::Dx => "dx",
            Algorithm::Jump => "jump",
            Algorithm::JumpBack => "jumpback",
            Algorithm::Binomial => "binomial",
            Algorithm::Flip => "flip",
            Algorithm::Power => "power",
            Algorithm::Memento => "memento",
            Algorithm::Recall => "recall",
            Algorithm::Rendezvous => "rendezvous",
            Algorithm::Maglev => "maglev",
            Algorithm::MultiProbe => "multiprobe",
            Algorithm::Ring => "ring",
        }
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self> {
        Algorithm::ALL
            .iter()
            .find(|a| a.tag() == tag.to_ascii_lowercase())
            .copied()
            .ok_or_else(|| Error::UnsupportedAlgorithm(tag.to_string()))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Validated engine parameters, as supplied by the configuration layer.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Hash function shared by the engine's draws.
    pub hash: HashAlgorithm,
    /// Anchor/Dx capacity as a multiple of the initial node count.
    pub capacity_multiplier: usize,
    /// Maglev table entries per backend.
    pub permutations: usize,
    /// Multi-probe draw count.
    pub probes: usize,
    /// Ring virtual nodes per physical node.
    pub virtual_nodes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hash: HashAlgorithm::Xx32,
            capacity_multiplier: 10,
            permutations: 128,
            probes: 21,
            virtual_nodes: 100,
        }
    }
}

/// Builds a ready-to-use cluster for `algorithm` over the initial `nodes`.
pub fn build(algorithm: Algorithm, config: &EngineConfig, nodes: &[Node]) -> Result<ConsistentHash> {
    crate::wrapper::validate_initial_nodes(nodes)?;
    if config.capacity_multiplier == 0 {
        return Err(Error::Precondition(
            "capacity multiplier must be positive".to_string(),
        ));
    }
    let hash: Arc<dyn HashFunction> = Arc::from(config.hash.build());
    let size = nodes.len();
    let capacity = size * config.capacity_multiplier;

    let cluster = match algorithm {
        Algorithm::Anchor => bucket(AnchorEngine::new(hash, capacity, size)?, nodes)?,
        Algorithm::Dx => bucket(DxEngine::new(hash, capacity, size)?, nodes)?,
        Algorithm::Jump => bucket(JumpEngine::new(hash, size), nodes)?,
        Algorithm::JumpBack => bucket(JumpBackEngine::new(hash, size), nodes)?,
        Algorithm::Binomial => bucket(BinomialEngine::new(hash, size), nodes)?,
        Algorithm::Flip => bucket(FlipEngine::new(hash, size), nodes)?,
        Algorithm::Power => bucket(PowerEngine::new(hash, size), nodes)?,
        Algorithm::Memento => bucket(MementoEngine::new(hash, size), nodes)?,
        Algorithm::Recall => bucket(RecallEngine::new(hash, size), nodes)?,
        Algorithm::Rendezvous => name(RendezvousEngine::new(hash), nodes)?,
        Algorithm::Maglev => name(
            MaglevEngine::new(hash, config.permutations, Primes::new())?,
            nodes,
        )?,
        Algorithm::MultiProbe => name(MultiProbeEngine::new(hash, config.probes)?, nodes)?,
        Algorithm::Ring => name(RingEngine::new(hash, config.virtual_nodes)?, nodes)?,
    };
    Ok(cluster)
}

fn bucket(
    engine: impl crate::engine::BucketEngine + 'static,
    nodes: &[Node],
) -> Result<ConsistentHash> {
    Ok(ConsistentHash::Bucket(BucketConsistentHash::new(
        Box::new(engine),
        nodes,
    )?))
}

fn name(
    engine: impl crate::engine::NameEngine + 'static,
    nodes: &[Node],
) -> Result<ConsistentHash> {
    Ok(ConsistentHash::Name(NameConsistentHash::new(
        Box::new(engine),
        nodes,
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(n: usize) -> Vec<Node> {
        (0..n).map(|i| Node::new(format!("node-{}", i))).collect()
    }

    #[test]
    fn every_algorithm_builds_and_resolves() {
        for algorithm in Algorithm::ALL {
            let cluster = build(algorithm, &EngineConfig::default(), &nodes(5)).unwrap();
            assert_eq!(cluster.node_count(), 5, "{}", algorithm);
            let node = cluster.node_for("some-key").unwrap();
            assert!(node.name().starts_with("node-"), "{}", algorithm);
        }
    }

    #[test]
    fn unknown_tag_fails_at_factory_time() {
        assert!(matches!(
            "quantum".parse::<Algorithm>(),
            Err(Error::UnsupportedAlgorithm(_))
        ));
        assert_eq!("JumpBack".parse::<Algorithm>().unwrap(), Algorithm::JumpBack);
    }

    #[test]
    fn empty_initial_set_fails_fast() {
        let err = build(Algorithm::Jump, &EngineConfig::default(), &[]).unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
    }
}
