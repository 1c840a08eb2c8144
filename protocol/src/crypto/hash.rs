//! # Hashing Utilities
//!
//! Moose uses exactly one hash function: SHA-256. It seeds key derivation,
//! derives addresses from public keys, produces the digest that gets signed,
//! and produces transaction ids.
//!
//! Addresses and ids share one more step: the first eight bytes of the
//! digest are read in reverse order as an unsigned 64-bit integer. Reading
//! the prefix little-endian is the same thing, which is what
//! [`digest_to_u64`] does.

use sha2::{Digest, Sha256};

/// SHA-256 digest length in bytes.
pub const DIGEST_LENGTH: usize = 32;

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use moose_protocol::crypto::sha256;
///
/// let hash = sha256(b"moose");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; DIGEST_LENGTH] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; DIGEST_LENGTH];
    output.copy_from_slice(&result);
    output
}

/// Hex-encoded SHA-256, for display and test vectors.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// The first eight digest bytes, reversed, as an unsigned integer.
///
/// `digest[7]` becomes the most significant byte and `digest[0]` the least.
pub fn digest_to_u64(digest: &[u8; DIGEST_LENGTH]) -> u64 {
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(prefix)
}

/// The eight-byte reversed prefix itself, for callers that want bytes.
pub fn first_eight_reversed(digest: &[u8; DIGEST_LENGTH]) -> [u8; 8] {
    let mut out = [0u8; 8];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = digest[7 - i];
    }
    out
}
