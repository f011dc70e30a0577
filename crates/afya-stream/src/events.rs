//! Typed stream events and their wire format.
//!
//! Each event serializes as a JSON object with a snake_case `type` tag.
//! Within one session the order is fixed: `session_start` first; on the
//! success path `final_response` then `session_end` last; on failure an
//! `error` event is emitted and `session_end` never follows it.

use afya_core::SessionId;
use serde::{Deserialize, Serialize};

/// One event in a session stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Opens the session. Always first.
    SessionStart {
        /// Session identifier (client-supplied or generated).
        session_id: SessionId,
        /// Language tag for the response (`en` or `ar`).
        language: String,
    },
    /// Human-readable progress note before generation completes.
    Thinking {
        /// Status text.
        message: String,
    },
    /// Cumulative response text so far.
    PartialResponse {
        /// All text emitted up to and including this chunk.
        text: String,
        /// Fraction of the full response emitted, in `[0, 1]`,
        /// non-decreasing, exactly `1.0` on the last chunk.
        progress: f64,
    },
    /// The complete response. Exactly once on success.
    FinalResponse {
        /// Full response text.
        message: String,
        /// Generator confidence in `[0, 1]`.
        confidence: f64,
        /// Language the response was generated in.
        language: String,
        /// Context tag (e.g. `healthcare`).
        context: String,
    },
    /// Generation failed mid-stream. `session_end` never follows this.
    Error {
        /// What went wrong, phrased for the client.
        message: String,
    },
    /// Closes the session. Always last on the success path.
    SessionEnd {
        /// Session identifier, echoing `session_start`.
        session_id: SessionId,
    },
}

impl StreamEvent {
    /// Build a `thinking` event.
    #[must_use]
    pub fn thinking(message: impl Into<String>) -> Self {
        Self::Thinking {
            message: message.into(),
        }
    }

    /// Build an `error` event.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// The wire name of this event's kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SessionStart { .. } => "session_start",
            Self::Thinking { .. } => "thinking",
            Self::PartialResponse { .. } => "partial_response",
            Self::FinalResponse { .. } => "final_response",
            Self::Error { .. } => "error",
            Self::SessionEnd { .. } => "session_end",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
