//! Benchmark-driver boundary.
//!
//! The benchmark layer measures raw engine primitives without paying for the
//! Node-typed wrapper. A pilot exposes exactly three operations; handles are
//! opaque to the driver and round-trip back into `remove_node`. Pilots are
//! generic over the concrete engine so the hot lookup path stays
//! monomorphized.

use crate::engine::{BucketEngine, NameEngine};
use crate::error::{Error, Result};

/// Opaque membership handle returned by [`Pilot::add_node`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PilotHandle {
    Bucket(usize),
    Name(String),
}

/// Raw-engine driving surface consumed by the benchmark layer.
pub trait Pilot {
    /// Resolves `key` against the raw engine.
    fn node_for(&self, key: &str) -> Result<PilotHandle>;

    /// Grows the engine by one member.
    fn add_node(&mut self) -> Result<PilotHandle>;

    /// Removes the member behind `handle`.
    fn remove_node(&mut self, handle: PilotHandle) -> Result<()>;
}

/// Pilot over a bucket-indexed engine; handles are bucket indices.
pub struct BucketPilot<E: BucketEngine> {
    engine: E,
}

impl<E: BucketEngine> BucketPilot<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

impl<E: BucketEngine> Pilot for BucketPilot<E> {
    fn node_for(&self, key: &str) -> Result<PilotHandle> {
        Ok(PilotHandle::Bucket(self.engine.bucket(key)?))
    }

    fn add_node(&mut self) -> Result<PilotHandle> {
        Ok(PilotHandle::Bucket(self.engine.add_bucket()?))
    }

    fn remove_node(&mut self, handle: PilotHandle) -> Result<()> {
        match handle {
            PilotHandle::Bucket(bucket) => {
                self.engine.remove_bucket(bucket)?;
                Ok(())
            }
            PilotHandle::Name(name) => Err(Error::Precondition(format!(
                "bucket pilot got a name handle: {}",
                name
            ))),
        }
    }
}

/// Pilot over a name-indexed engine; handles are generated resource names.
pub struct NamePilot<E: NameEngine> {
    engine: E,
    next_id: u64,
}

impl<E: NameEngine> NamePilot<E> {
    pub fn new(engine: E) -> Self {
        Self { engine, next_id: 0 }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

impl<E: NameEngine> Pilot for NamePilot<E> {
    fn node_for(&self, key: &str) -> Result<PilotHandle> {
        Ok(PilotHandle::Name(self.engine.resource(key)?.to_string()))
    }

    fn add_node(&mut self) -> Result<PilotHandle> {
        let name = format!("node-{}", self.next_id);
        self.next_id += 1;
        self.engine.add_resource(&name)?;
        Ok(PilotHandle::Name(name))
    }

    fn remove_node(&mut self, handle: PilotHandle) -> Result<()> {
        match handle {
            PilotHandle::Name(name) => self.engine.remove_resource(&name),
            PilotHandle::Bucket(bucket) => Err(Error::Precondition(format!(
                "name pilot got a bucket handle: {}",
                bucket
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine::{JumpEngine, RingEngine};
    use crate::hasher::Xx32Hash;

    #[test]
    fn bucket_pilot_round_trips_handles() {
        let mut pilot = BucketPilot::new(JumpEngine::new(Arc::new(Xx32Hash), 3));
        let handle = pilot.add_node().unwrap();
        assert_eq!(handle, PilotHandle::Bucket(3));
        pilot.remove_node(handle).unwrap();
        assert_eq!(pilot.engine().size(), 3);
        assert!(matches!(
            pilot.node_for("key").unwrap(),
            PilotHandle::Bucket(b) if b < 3
        ));
    }

    #[test]
    fn name_pilot_generates_unique_members() {
        let mut pilot = NamePilot::new(RingEngine::new(Arc::new(Xx32Hash), 8).unwrap());
        let first = pilot.add_node().unwrap();
        let second = pilot.add_node().unwrap();
        assert_ne!(first, second);
        pilot.remove_node(first).unwrap();
        assert_eq!(pilot.engine().size(), 1);
    }
}
