//! Auth error types.

use thiserror::Error;

/// Errors that can occur during token operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Credentials or token could not be verified.
    ///
    /// Deliberately carries no detail: bad password, unknown subject,
    /// tampered signature, and expired token all look identical to the
    /// caller.
    #[error("authentication failed")]
    Unauthenticated,

    /// Token encoding failed (misconfigured key or algorithm).
    #[error("token signing failed: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthenticated_display_is_generic() {
        let err = AuthError::Unauthenticated;
        assert_eq!(err.to_string(), "authentication failed");
    }

    #[test]
    fn auth_error_is_std_error() {
        let err = AuthError::Unauthenticated;
        let _: &dyn std::error::Error = &err;
    }
}
