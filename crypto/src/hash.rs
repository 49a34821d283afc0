//! Blake2b hashing for blocks.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use pledge_types::BlockHash;

type Blake2b256 = Blake2b<U32>;

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// Hash a block's canonical content together with its predecessor's hash.
pub fn hash_block(canonical: &[u8], previous: &BlockHash) -> BlockHash {
    BlockHash::new(blake2b_256_multi(&[canonical, previous.as_bytes()]))
}
