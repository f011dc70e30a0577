//! Constant-time credential verification.
//!
//! Two verification paths, mirroring how the service account is configured:
//!
//! - **Hash configured**: `salt$digest` (both base64), digest =
//!   SHA-256(salt || password). The recomputed digest is compared in
//!   constant time.
//! - **No hash**: the supplied password is compared against the configured
//!   plaintext in constant time, so a byte-by-byte mismatch position never
//!   leaks through response timing.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Salt length in bytes for newly hashed passwords.
const SALT_LEN: usize = 16;

/// Compare two byte slices in constant time.
///
/// Lengths are not secret; unequal lengths return `false` immediately.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Hash a password with a fresh random salt.
///
/// Returns the stored form `salt$digest` (both base64), suitable for the
/// `servicePasswordHash` setting.
#[must_use]
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    let digest = salted_digest(&salt, password);
    format!("{}${}", B64.encode(salt), B64.encode(digest))
}

/// Verify a password against a stored `salt$digest` hash.
///
/// Returns `false` for malformed stored values rather than erroring, so a
/// corrupt setting degrades to "wrong password" instead of a 500.
#[must_use]
pub fn verify_hash(password: &str, stored: &str) -> bool {
    let Some((salt_b64, digest_b64)) = stored.split_once('$') else {
        return false;
    };
    let (Ok(salt), Ok(digest)) = (B64.decode(salt_b64), B64.decode(digest_b64)) else {
        return false;
    };
    let computed = salted_digest(&salt, password);
    constant_time_eq(&computed, &digest)
}

/// Verify a password against either a configured hash or a plaintext.
#[must_use]
pub fn verify_password(password: &str, hash: Option<&str>, plaintext: &str) -> bool {
    match hash {
        Some(stored) => verify_hash(password, stored),
        None => constant_time_eq(password.as_bytes(), plaintext.as_bytes()),
    }
}

fn salted_digest(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_time_eq_equal() {
        assert!(constant_time_eq(b"secret", b"secret"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn constant_time_eq_unequal() {
        assert!(!constant_time_eq(b"secret", b"secreT"));
        assert!(!constant_time_eq(b"secret", b"secrets"));
        assert!(!constant_time_eq(b"a", b""));
    }

    #[test]
    fn hash_then_verify_roundtrip() {
        let stored = hash_password("correct horse battery staple");
        assert!(verify_hash("correct horse battery staple", &stored));
        assert!(!verify_hash("wrong password", &stored));
    }

    #[test]
    fn hashes_use_unique_salts() {
        let a = hash_password("same");
        let b = hash_password("same");
        assert_ne!(a, b);
        assert!(verify_hash("same", &a));
        assert!(verify_hash("same", &b));
    }

    #[test]
    fn stored_form_has_two_parts() {
        let stored = hash_password("pw");
        let parts: Vec<&str> = stored.split('$').collect();
        assert_eq!(parts.len(), 2);
    }

    #[test]
    fn malformed_stored_hash_rejects() {
        assert!(!verify_hash("pw", "no-dollar-sign"));
        assert!(!verify_hash("pw", "not!base64$alsonot!"));
        assert!(!verify_hash("pw", ""));
    }

    #[test]
    fn verify_password_prefers_hash() {
        let stored = hash_password("hashed-pw");
        assert!(verify_password("hashed-pw", Some(&stored), "plain-pw"));
        // plaintext is ignored when a hash is configured
        assert!(!verify_password("plain-pw", Some(&stored), "plain-pw"));
    }

    #[test]
    fn verify_password_falls_back_to_plaintext() {
        assert!(verify_password("plain-pw", None, "plain-pw"));
        assert!(!verify_password("other", None, "plain-pw"));
    }
}
