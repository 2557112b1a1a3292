//! Session key fingerprint for start-up logs.
//!
//! Lets operators tell which key a running instance uses after a rotation
//! without ever logging the key itself.

use actix_web::cookie::Key;
use sha2::{Digest, Sha256};

const FINGERPRINT_BYTES: usize = 8;

/// First 8 bytes of the SHA-256 of the signing key, as lowercase hex.
///
/// # Examples
///
/// ```rust
/// use actix_web::cookie::Key;
/// use bookshelf::inbound::http::session_config::fingerprint::key_fingerprint;
///
/// let fp = key_fingerprint(&Key::generate());
/// assert_eq!(fp.len(), 16);
/// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    digest
        .iter()
        .take(FINGERPRINT_BYTES)
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn same_key_material_gives_same_fingerprint() {
        let first = key_fingerprint(&Key::derive_from(&[b'a'; 64]));
        let second = key_fingerprint(&Key::derive_from(&[b'a'; 64]));
        assert_eq!(first, second);
        assert_eq!(first.len(), FINGERPRINT_BYTES * 2);
        assert_eq!(first, first.to_lowercase());
    }

    #[rstest]
    fn rotated_keys_are_distinguishable() {
        let old = key_fingerprint(&Key::derive_from(&[b'a'; 64]));
        let new = key_fingerprint(&Key::derive_from(&[b'b'; 64]));
        assert_ne!(old, new);
    }
}
