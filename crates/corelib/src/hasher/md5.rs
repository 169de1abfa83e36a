//! MD5 hash function implementation.

use crate::hasher::traits::HashFunction;

/// MD5 hash truncated to the first 4 digest bytes, big-endian, interpreted as
/// an unsigned magnitude.
#[derive(Clone, Copy, Debug, Default)]
pub struct Md5Hash;

impl HashFunction for Md5Hash {
    fn hash(&self, bytes: &[u8]) -> i64 {
        let digest = md5::compute(bytes).0;
        let head = [digest[0], digest[1], digest[2], digest[3]];
        u32::from_be_bytes(head) as i64
    }

    fn name(&self) -> &'static str {
        "md5"
    }
}
