//! Maglev lookup-table engine.
//!
//! Each backend owns a permutation of the table slots derived from two
//! hashes (offset and skip); the population round-robins the backends, each
//! claiming its next unclaimed slot, so every backend ends up with a
//! near-equal share. Lookups are a single table index. Membership changes
//! rebuild the whole table.

use std::sync::Arc;

use crate::engine::traits::NameEngine;
use crate::error::{Error, Result};
use crate::hasher::HashFunction;
use crate::sequence::Primes;

/// Slot not yet claimed during population.
const EMPTY: u32 = u32::MAX;

/// Seeds separating the offset and skip draws per backend.
const OFFSET_SEED: u32 = 0xB1;
const SKIP_SEED: u32 = 0xB2;

/// Maglev engine; the table is sized to the smallest prime at or above
/// `permutations * backend count` so every skip is coprime with it.
pub struct MaglevEngine {
    hash: Arc<dyn HashFunction>,
    primes: Primes,
    permutations: usize,
    backends: Vec<String>,
    table: Vec<u32>,
    lookup_size: usize,
}

impl MaglevEngine {
    pub fn new(hash: Arc<dyn HashFunction>, permutations: usize, primes: Primes) -> Result<Self> {
        if permutations == 0 {
            return Err(Error::Precondition(
                "maglev permutations must be positive".to_string(),
            ));
        }
        Ok(Self {
            hash,
            primes,
            permutations,
            backends: Vec::new(),
            table: Vec::new(),
            lookup_size: 0,
        })
    }

    pub fn lookup_size(&self) -> usize {
        self.lookup_size
    }

    fn rebuild(&mut self) {
        if self.backends.is_empty() {
            self.table.clear();
            self.lookup_size = 0;
            return;
        }
        let m = self
            .primes
            .next_prime(self.permutations * self.backends.len());
        self.lookup_size = m;
        self.table.clear();
        self.table.resize(m, EMPTY);

        let params: Vec<(usize, usize)> = self
            .backends
            .iter()
            .map(|name| {
                let offset = self.hash.hash_str_seed(name, OFFSET_SEED) as u64 % m as u64;
                let skip = self.hash.hash_str_seed(name, SKIP_SEED) as u64 % (m as u64 - 1) + 1;
                (offset as usize, skip as usize)
            })
            .collect();

        let mut next = vec![0usize; self.backends.len()];
        let mut filled = 0;
        while filled < m {
            for (backend, &(offset, skip)) in params.iter().enumerate() {
                loop {
                    let slot = (offset + next[backend] * skip) % m;
                    next[backend] += 1;
                    if self.table[slot] == EMPTY {
                        self.table[slot] = backend as u32;
                        filled += 1;
                        break;
                    }
                }
                if filled == m {
                    break;
                }
            }
        }
        tracing::debug!(
            backends = self.backends.len(),
            lookup_size = m,
            "maglev table rebuilt"
        );
    }
}

impl NameEngine for MaglevEngine {
    fn resource(&self, key: &str) -> Result<&str> {
        if self.backends.is_empty() {
            return Err(Error::EmptyCluster);
        }
        let slot = self.hash.hash_str(key) as u64 % self.lookup_size as u64;
        let backend = self.table[slot as usize] as usize;
        Ok(&self.backends[backend])
    }

    fn add_resource(&mut self, name: &str) -> Result<()> {
        match self.backends.binary_search_by(|b| b.as_str().cmp(name)) {
            Ok(_) => Err(Error::DuplicateNode(name.to_string())),
            Err(at) => {
                self.backends.insert(at, name.to_string());
                self.rebuild();
                Ok(())
            }
        }
    }

    fn remove_resource(&mut self, name: &str) -> Result<()> {
        match self.backends.binary_search_by(|b| b.as_str().cmp(name)) {
            Ok(at) => {
                self.backends.remove(at);
                self.rebuild();
                Ok(())
            }
            Err(_) => Err(Error::NodeNotFound(name.to_string())),
        }
    }

    fn size(&self) -> usize {
        self.backends.len()
    }

    fn name(&self) -> &'static str {
        "maglev"
    }
}
