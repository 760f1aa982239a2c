//! Body digests for stored responses.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hex digest of a response body.
pub fn body_digest(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}
