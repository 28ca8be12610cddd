//! SHA-256 hex digests.
//!
//! Used for custom-style upload fingerprints (the cache-key identity of
//! a visitor-supplied reference image) and as the digest behind session
//! token signatures.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}
