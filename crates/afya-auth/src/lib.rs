//! # afya-auth
//!
//! Bearer-token issuing and validation for the Afya gateway.
//!
//! The [`TokenService`] signs short-lived JWTs for the single configured
//! service account and validates them on every protected call. Password
//! checks are constant-time: either a salted-hash verification when a hash
//! is configured, or a constant-time comparison against the configured
//! plaintext password otherwise.
//!
//! Every failure — bad credentials, tampered token, expired token, missing
//! subject — surfaces as the same [`AuthError::Unauthenticated`] kind so
//! clients cannot probe which part of the check failed. The concrete reason
//! is logged server-side at debug level.

#![deny(unsafe_code)]

pub mod errors;
pub mod token;
pub mod verify;

pub use errors::AuthError;
pub use token::{Claims, Identity, IssuedToken, TokenService};
pub use verify::{constant_time_eq, hash_password, verify_hash};

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
