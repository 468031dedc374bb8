//! Manifest checksums recorded in `Packsmith.lock`.

use sha2::{Digest, Sha256};

/// SHA-256 of a manifest's raw text, as lowercase hex.
pub fn manifest_checksum(content: &str) -> String {
    format!("{:x}", Sha256::digest(content.as_bytes()))
}
