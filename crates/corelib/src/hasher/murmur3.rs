//! Murmur3-32 hash function implementation.

use std::io::Cursor;

use crate::hasher::traits::HashFunction;

/// 32-bit Murmur3. The signed digest's absolute value is taken so callers
/// never observe a negative hash.
#[derive(Clone, Copy, Debug, Default)]
pub struct Murmur3Hash;

impl HashFunction for Murmur3Hash {
    fn hash(&self, bytes: &[u8]) -> i64 {
        // Reading from an in-memory cursor cannot fail.
        let digest = murmur3::murmur3_32(&mut Cursor::new(bytes), 0).unwrap_or_default();
        (digest as i32).unsigned_abs() as i64
    }

    fn name(&self) -> &'static str {
        "murmur3"
    }
}
