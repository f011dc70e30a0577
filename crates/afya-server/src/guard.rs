//! The auth guard: token validation plus sliding-window admission.
//!
//! Every protected operation passes through exactly this check before any
//! business logic runs. The HTTP side is an axum middleware that attaches
//! the authenticated [`Identity`] to request extensions; the WebSocket side
//! runs the same check once at connection establishment and maps failures
//! to distinct close codes.

use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use metrics::counter;
use tracing::debug;

use afya_auth::Identity;
use afya_core::GatewayError;
use afya_core::constants::{
    ANONYMOUS_KEY, WS_CLOSE_FORBIDDEN, WS_CLOSE_RATE_LIMITED, WS_CLOSE_UNAUTHENTICATED,
};

use crate::errors::ApiError;
use crate::metrics::{AUTH_FAILURES_TOTAL, RATE_LIMITED_TOTAL};
use crate::state::AppState;

/// Extract a bearer token from the `Authorization` header.
#[must_use]
pub fn bearer_from_headers(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim().to_owned())
        .filter(|t| !t.is_empty())
}

/// Extract a token from a raw query string (`token=...`).
///
/// JWTs are URL-safe, so no percent-decoding is needed.
#[must_use]
pub fn token_from_query(query: &str) -> Option<String> {
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("token="))
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

/// Derive the rate-limit key: subject, else peer address, else anonymous.
#[must_use]
pub fn rate_key(identity: Option<&Identity>, peer: Option<IpAddr>) -> String {
    identity
        .map(|i| i.subject.clone())
        .or_else(|| peer.map(|ip| ip.to_string()))
        .unwrap_or_else(|| ANONYMOUS_KEY.to_owned())
}

/// Validate the token and admit the call through the rate limiter.
///
/// Short-circuits with the specific failure kind; the identity is returned
/// for the caller to attach to its context.
pub fn authorize(
    state: &AppState,
    token: Option<&str>,
    peer: Option<IpAddr>,
) -> Result<Identity, GatewayError> {
    let Some(token) = token else {
        counter!(AUTH_FAILURES_TOTAL).increment(1);
        return Err(GatewayError::Unauthenticated);
    };
    let identity = state.tokens.validate(token).map_err(|_| {
        counter!(AUTH_FAILURES_TOTAL).increment(1);
        GatewayError::Unauthenticated
    })?;
    let key = rate_key(Some(&identity), peer);
    state.limiter.admit(&key).map_err(|_| {
        counter!(RATE_LIMITED_TOTAL).increment(1);
        debug!(key, "rate limit exceeded");
        GatewayError::RateLimited
    })?;
    Ok(identity)
}

/// Axum middleware guarding the protected HTTP routes.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_from_headers(req.headers())
        .or_else(|| req.uri().query().and_then(token_from_query));
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());

    let identity = authorize(&state, token.as_deref(), peer)?;
    debug!(subject = %identity.subject, path = %req.uri().path(), "request authorized");
    let _ = req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Admission result for a WebSocket handshake.
pub enum WsAdmission {
    /// Admitted; the identity is attached to the connection.
    Granted(Identity),
    /// Rejected; close with this code immediately after upgrade.
    Rejected(u16),
}

/// Run the guard for a WebSocket handshake.
///
/// `required_scope` gates role-restricted sockets; a valid token without
/// the scope is rejected with its own close code.
#[must_use]
pub fn authorize_ws(
    state: &AppState,
    token: Option<&str>,
    required_scope: Option<&str>,
) -> WsAdmission {
    let identity = match authorize(state, token, None) {
        Ok(identity) => identity,
        Err(GatewayError::RateLimited) => return WsAdmission::Rejected(WS_CLOSE_RATE_LIMITED),
        Err(_) => return WsAdmission::Rejected(WS_CLOSE_UNAUTHENTICATED),
    };
    if let Some(scope) = required_scope {
        if !identity.has_scope(scope) {
            debug!(subject = %identity.subject, scope, "missing required scope");
            return WsAdmission::Rejected(WS_CLOSE_FORBIDDEN);
        }
    }
    WsAdmission::Granted(identity)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
