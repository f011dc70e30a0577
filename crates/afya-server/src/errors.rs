//! HTTP error responses.
//!
//! [`ApiError`] wraps the gateway error taxonomy and renders it:
//!
//! - 401 with `WWW-Authenticate: Bearer` for unauthenticated calls
//! - 429 for rate-limited calls
//! - 422 with per-field detail for validation failures
//! - 502 for an upstream failure that escaped a handler (handlers normally
//!   degrade these to fallback payloads instead)
//! - 500 with a generic body carrying a timestamp and the request path,
//!   never internals

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use afya_core::GatewayError;

/// A failed API call, with the request path for 500 bodies.
#[derive(Debug)]
pub struct ApiError {
    /// The underlying failure.
    pub kind: GatewayError,
    /// Request path, included in internal-error payloads.
    pub path: Option<String>,
}

impl ApiError {
    /// Wrap a gateway error without path context.
    #[must_use]
    pub fn new(kind: GatewayError) -> Self {
        Self { kind, path: None }
    }

    /// Wrap a gateway error with the request path.
    #[must_use]
    pub fn with_path(kind: GatewayError, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: Some(path.into()),
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(kind: GatewayError) -> Self {
        Self::new(kind)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.kind.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let timestamp = chrono::Utc::now().to_rfc3339();

        match self.kind {
            GatewayError::Unauthenticated => {
                let body = Json(json!({
                    "error": "Could not validate credentials",
                    "code": "UNAUTHENTICATED",
                }));
                let mut resp = (status, body).into_response();
                let _ = resp.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    HeaderValue::from_static("Bearer"),
                );
                resp
            }
            GatewayError::RateLimited => (
                status,
                Json(json!({
                    "error": "Rate limit exceeded",
                    "code": "RATE_LIMITED",
                })),
            )
                .into_response(),
            GatewayError::Validation(v) => (
                status,
                Json(json!({
                    "error": "Validation failed",
                    "code": "VALIDATION_FAILED",
                    "detail": v.fields,
                })),
            )
                .into_response(),
            GatewayError::Upstream { service, message } => {
                error!(service, message, "upstream failure escaped handler");
                (
                    status,
                    Json(json!({
                        "error": "Upstream service unavailable",
                        "code": "UPSTREAM_UNAVAILABLE",
                        "timestamp": timestamp,
                    })),
                )
                    .into_response()
            }
            GatewayError::Internal { message } => {
                error!(message, path = self.path.as_deref(), "internal error");
                (
                    status,
                    Json(json!({
                        "error": "Internal server error",
                        "status": 500,
                        "timestamp": timestamp,
                        "path": self.path,
                    })),
                )
                    .into_response()
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
