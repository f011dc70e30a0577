//! # afya-core
//!
//! Foundation types for the Afya gateway: the gateway-wide error taxonomy,
//! branded ID newtypes, and shared wire constants.
//!
//! Every failure a client can observe maps to one of the five
//! [`GatewayError`] kinds; the stable machine codes and HTTP statuses live
//! here so the HTTP and WebSocket layers stay in agreement.

#![deny(unsafe_code)]

pub mod constants;
pub mod errors;
pub mod ids;

pub use errors::{FieldError, GatewayError, ValidationError};
pub use ids::{ClaimId, ConnectionId, SessionId};

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
