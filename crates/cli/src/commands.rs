//! CLI commands.

use std::collections::BTreeMap;
use std::str::FromStr;

use anyhow::{bail, Context};
use clap::{Args, Subcommand};

use corelib::factory::{build, Algorithm, EngineConfig};
use corelib::hasher::HashAlgorithm;
use corelib::node::Node;
use corelib::ConsistentHash;

/// Engine parameters shared by the cluster-building commands.
#[derive(Debug, Args)]
pub struct EngineArgs {
    /// Consistent-hash algorithm tag.
    #[arg(long, default_value = "jump")]
    pub algorithm: String,

    /// Hash function tag.
    #[arg(long, default_value = "xx32")]
    pub hash: String,

    /// Initial cluster size.
    #[arg(long, default_value_t = 10)]
    pub nodes: usize,

    /// Anchor/Dx capacity as a multiple of the node count.
    #[arg(long, default_value_t = 10)]
    pub capacity_multiplier: usize,

    /// Maglev table entries per backend.
    #[arg(long, default_value_t = 128)]
    pub permutations: usize,

    /// Multi-probe draw count.
    #[arg(long, default_value_t = 21)]
    pub probes: usize,

    /// Ring virtual nodes per physical node.
    #[arg(long, default_value_t = 100)]
    pub virtual_nodes: usize,
}

impl EngineArgs {
    fn validate(&self) -> anyhow::Result<(Algorithm, EngineConfig)> {
        if self.nodes == 0 {
            bail!("--nodes must be at least 1");
        }
        if self.capacity_multiplier == 0 || self.permutations == 0 || self.probes == 0 || self.virtual_nodes == 0 {
            bail!("engine parameters must be positive");
        }
        let algorithm = Algorithm::from_str(&self.algorithm)
            .with_context(|| format!("unknown algorithm {:?}", self.algorithm))?;
        let hash = HashAlgorithm::from_str(&self.hash)
            .with_context(|| format!("unknown hash function {:?}", self.hash))?;
        let config = EngineConfig {
            hash,
            capacity_multiplier: self.capacity_multiplier,
            permutations: self.permutations,
            probes: self.probes,
            virtual_nodes: self.virtual_nodes,
        };
        Ok((algorithm, config))
    }

    fn build_cluster(&self) -> anyhow::Result<ConsistentHash> {
        let (algorithm, config) = self.validate()?;
        let nodes: Vec<Node> = (0..self.nodes)
            .map(|i| Node::new(format!("node-{}", i)))
            .collect();
        Ok(build(algorithm, &config, &nodes)?)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List available algorithms and hash functions.
    Algorithms,
    /// Show how keys distribute over the cluster members.
    Distribution {
        #[command(flatten)]
        engine: EngineArgs,
        /// Number of sequential sample keys.
        #[arg(long, default_value_t = 100_000)]
        keys: usize,
        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Measure how many keys remap when one node joins.
    Resize {
        #[command(flatten)]
        engine: EngineArgs,
        /// Number of sequential sample keys.
        #[arg(long, default_value_t = 100_000)]
        keys: usize,
    },
}

impl Command {
    pub fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Algorithms => {
                println!("algorithms:");
                for algorithm in Algorithm::ALL {
                    println!("  {}", algorithm.tag());
                }
                println!("hash functions:");
                for hash in ["crc32", "md5", "xx32", "murmur3"] {
                    println!("  {}", hash);
                }
                Ok(())
            }
            Command::Distribution { engine, keys, json } => distribution(&engine, keys, json),
            Command::Resize { engine, keys } => resize(&engine, keys),
        }
    }
}

fn distribution(engine: &EngineArgs, keys: usize, json: bool) -> anyhow::Result<()> {
    if keys == 0 {
        bail!("--keys must be at least 1");
    }
    let cluster = engine.build_cluster()?;
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for i in 0..keys {
        let node = cluster.node_for(&format!("key-{}", i))?;
        *counts.entry(node.name().to_string()).or_default() += 1;
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
        return Ok(());
    }
    let expected = keys as f64 / cluster.node_count() as f64;
    println!("{:<16} {:>10} {:>9}", "node", "keys", "vs even");
    for (name, count) in &counts {
        println!(
            "{:<16} {:>10} {:>8.1}%",
            name,
            count,
            (*count as f64 / expected - 1.0) * 100.0
        );
    }
    Ok(())
}

fn resize(engine: &EngineArgs, keys: usize) -> anyhow::Result<()> {
    if keys == 0 {
        bail!("--keys must be at least 1");
    }
    let mut cluster = engine.build_cluster()?;
    let before: Vec<String> = (0..keys)
        .map(|i| {
            cluster
                .node_for(&format!("key-{}", i))
                .map(|n| n.name().to_string())
        })
        .collect::<Result<_, _>>()?;

    cluster.add_nodes(&[Node::new("joiner")])?;
    let mut moved = 0usize;
    let mut to_joiner = 0usize;
    for (i, owner) in before.iter().enumerate() {
        let now = cluster.node_for(&format!("key-{}", i))?;
        if now.name() != owner {
            moved += 1;
            if now.name() == "joiner" {
                to_joiner += 1;
            }
        }
    }
    println!(
        "{} keys sampled; {} remapped ({:.2}%), {} of those to the joining node",
        keys,
        moved,
        moved as f64 / keys as f64 * 100.0,
        to_joiner
    );
    Ok(())
}
