//! Shared SHA-256 hex digest utility.
//!
//! Used by `naming` to disambiguate element keys that sanitize to the same
//! filename.

use sha2::{Digest, Sha256};

/// Number of hex characters kept by [`short_hash`].
pub const SHORT_HASH_LEN: usize = 8;

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// First [`SHORT_HASH_LEN`] hex characters of the SHA-256 digest of `text`.
pub fn short_hash(text: &str) -> String {
    let mut hex = sha256_hex(text.as_bytes());
    hex.truncate(SHORT_HASH_LEN);
    hex
}
