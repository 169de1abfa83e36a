//! Cross-engine property tests.
//!
//! # Test Strategy
//!
//! 1. **Determinism**: same key, same cluster state, same answer
//! 2. **Single-node funnel**: one member catches every key
//! 3. **Balance**: no starved bucket under a large key sample
//! 4. **Append/remove-at-top**: size-driven engines reject random removals
//! 5. **Round trip**: add-then-remove restores prior assignments

use std::sync::Arc;

use corelib::engine::{
    BinomialEngine, BucketEngine, FlipEngine, JumpBackEngine, JumpEngine, PowerEngine,
    RecallEngine,
};
use corelib::factory::{build, Algorithm, EngineConfig};
use corelib::hasher::{HashAlgorithm, Xx32Hash};
use corelib::node::Node;
use corelib::Error;

fn nodes(n: usize) -> Vec<Node> {
    (0..n).map(|i| Node::new(format!("node-{}", i))).collect()
}

fn size_driven_engines(size: usize) -> Vec<Box<dyn BucketEngine>> {
    let hash: Arc<Xx32Hash> = Arc::new(Xx32Hash);
    vec![
        Box::new(JumpEngine::new(hash.clone(), size)),
        Box::new(JumpBackEngine::new(hash.clone(), size)),
        Box::new(BinomialEngine::new(hash.clone(), size)),
        Box::new(FlipEngine::new(hash.clone(), size)),
        Box::new(PowerEngine::new(hash.clone(), size)),
        Box::new(RecallEngine::new(hash, size)),
    ]
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_lookups_are_deterministic() {
    for algorithm in Algorithm::ALL {
        let cluster = build(algorithm, &EngineConfig::default(), &nodes(7)).unwrap();
        for i in 0..100 {
            let key = format!("key-{}", i);
            let first = cluster.node_for(&key).unwrap().clone();
            let second = cluster.node_for(&key).unwrap().clone();
            assert_eq!(first, second, "{} drifted on {}", algorithm, key);
        }
    }
}

#[test]
fn test_determinism_across_hash_functions() {
    for hash in [
        HashAlgorithm::Crc32,
        HashAlgorithm::Md5,
        HashAlgorithm::Xx32,
        HashAlgorithm::Murmur3,
    ] {
        let config = EngineConfig {
            hash,
            ..EngineConfig::default()
        };
        let a = build(Algorithm::Anchor, &config, &nodes(5)).unwrap();
        let b = build(Algorithm::Anchor, &config, &nodes(5)).unwrap();
        for i in 0..200 {
            let key = format!("key-{}", i);
            assert_eq!(
                a.node_for(&key).unwrap(),
                b.node_for(&key).unwrap(),
                "separate instances disagree under {}",
                hash
            );
        }
    }
}

// ============================================================================
// Single-node funnel
// ============================================================================

#[test]
fn test_single_node_funnel() {
    for algorithm in Algorithm::ALL {
        let cluster = build(algorithm, &EngineConfig::default(), &nodes(1)).unwrap();
        for i in 0..150 {
            let node = cluster.node_for(&format!("any_string_{}", i)).unwrap();
            assert_eq!(node.name(), "node-0", "{} leaked a key", algorithm);
        }
    }
}

// ============================================================================
// Balance
// ============================================================================

#[test]
fn test_no_bucket_starves() {
    let member_count = 8;
    for algorithm in Algorithm::ALL {
        let cluster = build(algorithm, &EngineConfig::default(), &nodes(member_count)).unwrap();
        let mut counts = vec![0usize; member_count];
        for i in 0..member_count * 1000 {
            let node = cluster.node_for(&format!("key-{}", i)).unwrap();
            let index: usize = node.name()["node-".len()..].parse().unwrap();
            counts[index] += 1;
        }
        for (member, &count) in counts.iter().enumerate() {
            assert!(
                count > 0,
                "{} starved node-{}: {:?}",
                algorithm,
                member,
                counts
            );
        }
    }
}

// ============================================================================
// Append/remove-at-top restriction
// ============================================================================

#[test]
fn test_size_driven_engines_reject_non_top_removal() {
    for mut engine in size_driven_engines(5) {
        for bucket in 0..4 {
            assert!(
                matches!(
                    engine.remove_bucket(bucket),
                    Err(Error::NonTopRemoval { .. })
                ),
                "{} removed non-top bucket {}",
                engine.name(),
                bucket
            );
        }
        assert_eq!(engine.size(), 5, "{} mutated on failure", engine.name());
        assert_eq!(engine.remove_bucket(4).unwrap(), 4);
    }
}

#[test]
fn test_add_bucket_returns_the_next_index() {
    for mut engine in size_driven_engines(3) {
        assert_eq!(engine.add_bucket().unwrap(), 3, "{}", engine.name());
        assert_eq!(engine.size(), 4);
    }
}

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn test_add_then_remove_restores_assignments() {
    for mut engine in size_driven_engines(6) {
        let name = engine.name();
        let before: Vec<usize> = (0..400)
            .map(|i| engine.bucket(&format!("k{}", i)).unwrap())
            .collect();
        let added = engine.add_bucket().unwrap();
        engine.remove_bucket(added).unwrap();
        assert_eq!(engine.size(), 6, "{}", name);
        let after: Vec<usize> = (0..400)
            .map(|i| engine.bucket(&format!("k{}", i)).unwrap())
            .collect();
        assert_eq!(before, after, "{} shuffled stable keys", name);
    }
}

// ============================================================================
// Growth disruption through the wrapper
// ============================================================================

#[test]
fn test_growth_moves_keys_only_to_the_new_node() {
    // Engines that claim monotonic growth: keys either stay put or land on
    // the member that just joined.
    for algorithm in [
        Algorithm::Jump,
        Algorithm::JumpBack,
        Algorithm::Binomial,
        Algorithm::Flip,
        Algorithm::Power,
        Algorithm::Recall,
    ] {
        let mut cluster = build(algorithm, &EngineConfig::default(), &nodes(6)).unwrap();
        let before: Vec<String> = (0..1500)
            .map(|i| cluster.node_for(&format!("k{}", i)).unwrap().name().to_string())
            .collect();
        cluster.add_nodes(&[Node::new("joiner")]).unwrap();
        for (i, owner) in before.iter().enumerate() {
            let now = cluster.node_for(&format!("k{}", i)).unwrap().name();
            assert!(
                now == owner || now == "joiner",
                "{}: key k{} moved {} -> {}",
                algorithm,
                i,
                owner,
                now
            );
        }
    }
}
