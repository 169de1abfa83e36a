//! Core engine trait definitions.
//!
//! Two engine families share the workload: bucket-indexed engines map a key
//! to an integer bucket in `[0, size)` and leave node identity to the
//! indirection layer; name-indexed engines resolve a key directly to an
//! opaque resource name. Neither family ever sees a [`crate::Node`].

use crate::error::Result;

/// A consistent-hashing engine over integer buckets.
///
/// `add_bucket` always returns a bucket that is immediately resolvable by
/// `bucket`. Beyond that, the contract makes no promise of bucket-value
/// stability; which bucket gets reused on add, and how lookups rehash around
/// removed buckets, is what distinguishes the algorithms.
pub trait BucketEngine: Send {
    /// Maps `key` to a working bucket.
    fn bucket(&self, key: &str) -> Result<usize>;

    /// Brings one bucket into the working set and returns its index.
    fn add_bucket(&mut self) -> Result<usize>;

    /// Removes `bucket` from the working set, returning it.
    ///
    /// Engines that do not support random removals fail with
    /// [`crate::Error::NonTopRemoval`] unless `bucket == size() - 1`.
    fn remove_bucket(&mut self, bucket: usize) -> Result<usize>;

    /// Number of working buckets.
    fn size(&self) -> usize;

    /// Maximum bucket count addressable without reallocation.
    fn capacity(&self) -> usize;

    /// Whether any working bucket may be removed, or only the last-added one.
    fn supports_random_removals(&self) -> bool {
        false
    }

    /// Returns the name of this engine.
    fn name(&self) -> &'static str;
}

/// A consistent-hashing engine over named resources.
pub trait NameEngine: Send {
    /// Maps `key` to a working resource name.
    fn resource(&self, key: &str) -> Result<&str>;

    /// Adds `name` to the resource set.
    fn add_resource(&mut self, name: &str) -> Result<()>;

    /// Removes `name` from the resource set.
    fn remove_resource(&mut self, name: &str) -> Result<()>;

    /// Number of working resources.
    fn size(&self) -> usize;

    /// Returns the name of this engine.
    fn name(&self) -> &'static str;
}
