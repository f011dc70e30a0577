//! # afya-server
//!
//! Axum HTTP + WebSocket server for the Afya gateway.
//!
//! Every protected operation — request/response or streaming — passes
//! through the auth guard (token validation plus sliding-window admission)
//! before any business logic runs. Accepted calls either return a single
//! JSON object or open a session stream delivered over SSE or WebSocket
//! frames, both fed by the same session driver.

#![deny(unsafe_code)]

pub mod errors;
pub mod guard;
pub mod metrics;
pub mod routes;
pub mod server;
pub mod state;
pub mod validation;
pub mod ws;

pub use server::GatewayServer;
pub use state::AppState;
