//! Gateway-wide error taxonomy.
//!
//! Five kinds cover every client-observable failure:
//!
//! - [`GatewayError::Unauthenticated`] — bad credentials or an
//!   invalid/expired/malformed token. Reasons are never distinguished to
//!   the client.
//! - [`GatewayError::RateLimited`] — sliding-window quota exceeded.
//! - [`GatewayError::Validation`] — a request body failed its declared
//!   field constraints, with per-field detail.
//! - [`GatewayError::Upstream`] — a downstream collaborator call failed;
//!   callers degrade to a fallback payload instead of propagating this.
//! - [`GatewayError::Internal`] — unexpected fault, logged with context
//!   and surfaced as a generic 500.

use serde::Serialize;
use thiserror::Error;

/// A single field-level validation failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Name of the offending field.
    pub field: String,
    /// What the field failed to satisfy.
    pub message: String,
}

/// Accumulated validation failures for one request body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationError {
    /// Per-field failures, in declaration order.
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field`.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Whether any failures were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Consume the accumulator: `Ok(())` if clean, `Err(self)` otherwise.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.fields.iter().map(|e| e.field.as_str()).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

/// Top-level error type for the Afya gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Credentials or token could not be verified.
    #[error("authentication failed")]
    Unauthenticated,

    /// The caller exceeded the sliding-window quota.
    #[error("rate limit exceeded")]
    RateLimited,

    /// The request body failed field validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A downstream collaborator call failed.
    #[error("upstream service {service} unavailable: {message}")]
    Upstream {
        /// Logical name of the downstream service.
        service: String,
        /// What went wrong, for server-side logs only.
        message: String,
    },

    /// Unexpected internal fault.
    #[error("internal error: {message}")]
    Internal {
        /// Description for server-side logs; never sent to clients.
        message: String,
    },
}

impl std::error::Error for ValidationError {}

impl GatewayError {
    /// Build an internal error from any displayable cause.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Build an upstream error for the named service.
    #[must_use]
    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code for this error kind.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::RateLimited => "RATE_LIMITED",
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::Upstream { .. } => "UPSTREAM_UNAVAILABLE",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// HTTP status for this error kind.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::RateLimited => 429,
            Self::Validation(_) => 422,
            Self::Upstream { .. } => 502,
            Self::Internal { .. } => 500,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
