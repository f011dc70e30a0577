//! # afya-stream
//!
//! The session stream protocol: an ordered, server-to-client sequence of
//! typed events delivering one incrementally generated response.
//!
//! The protocol is transport-agnostic. A [`session::SessionDriver`] task
//! produces [`events::StreamEvent`]s on an `mpsc` channel; the SSE and
//! WebSocket adapters in the server crate consume the same receiver, so both
//! transports share one state machine.

#![deny(unsafe_code)]

pub mod chunker;
pub mod events;
pub mod session;

pub use chunker::WordChunks;
pub use events::StreamEvent;
pub use session::{FinalPayload, SessionDriver, SessionParams, SessionPhase, StreamConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
