//! Error types for the core library.

use thiserror::Error;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the core library.
///
/// Every failure is surfaced synchronously and leaves the engine, the
/// indirection table, and the wrapper untouched: callers may treat any `Err`
/// as "no state change occurred".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Construction-time precondition violation (empty node set, zero
    /// parameter, and similar). Raised before any state is mutated.
    #[error("precondition violated: {0}")]
    Precondition(String),
    /// A bucket-indexed engine was asked to add beyond its fixed capacity.
    #[error("engine capacity exhausted ({capacity} buckets)")]
    CapacityExhausted { capacity: usize },
    /// Bucket index outside the engine's or indirection's addressable range.
    #[error("bucket {bucket} out of range (capacity {capacity})")]
    InvalidBucket { bucket: usize, capacity: usize },
    /// The node is not a member of the cluster.
    #[error("unknown node: {0}")]
    NodeNotFound(String),
    /// The node is already a member of the cluster.
    #[error("duplicate node: {0}")]
    DuplicateNode(String),
    /// The bucket is already bound to another node.
    #[error("bucket {0} is already mapped")]
    DuplicateBucket(usize),
    /// An append/remove-at-top-only engine was asked to remove a bucket other
    /// than the most recently added one.
    #[error("bucket {bucket} is not the top bucket (size {size}); this engine only removes the last-added bucket")]
    NonTopRemoval { bucket: usize, size: usize },
    /// Lookup against a cluster with no working buckets or resources.
    #[error("cluster has no working members")]
    EmptyCluster,
    /// Algorithm tag (hash function or consistent-hash engine) not recognized.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
}
