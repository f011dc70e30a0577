//! Session driver: the state machine that produces one session's events.
//!
//! The driver walks Start → Thinking → Streaming → Done (or Failed) and
//! emits events on an `mpsc` channel. Each send awaits channel capacity, so
//! the transport's flush rate paces generation. When the consumer goes away
//! (client disconnect), the next send fails and the driver stops at that
//! suspension point — no further events, no panic, terminal phase
//! [`SessionPhase::Cancelled`].

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, instrument};

use afya_core::SessionId;
use afya_settings::StreamSettings;

use crate::chunker::WordChunks;
use crate::events::StreamEvent;

/// Outbound channel capacity per session.
const CHANNEL_CAPACITY: usize = 32;

/// Status text sent with the `thinking` event.
const THINKING_MESSAGE: &str = "Analyzing your healthcare query...";

/// Pacing and chunking knobs for one session.
#[derive(Clone, Copy, Debug)]
pub struct StreamConfig {
    /// Words per `partial_response` chunk.
    pub chunk_words: usize,
    /// Delay after the `thinking` event.
    pub thinking_delay: Duration,
    /// Delay between chunks.
    pub chunk_delay: Duration,
}

impl From<&StreamSettings> for StreamConfig {
    fn from(settings: &StreamSettings) -> Self {
        Self {
            chunk_words: settings.chunk_words,
            thinking_delay: Duration::from_millis(settings.thinking_delay_ms),
            chunk_delay: Duration::from_millis(settings.chunk_delay_ms),
        }
    }
}

/// Identity of one streaming interaction.
#[derive(Clone, Debug)]
pub struct SessionParams {
    /// Session identifier (client-supplied or generated).
    pub session_id: SessionId,
    /// Language tag for the response.
    pub language: String,
}

/// The completed generation a session streams out.
#[derive(Clone, Debug)]
pub struct FinalPayload {
    /// Full response text.
    pub message: String,
    /// Generator confidence in `[0, 1]`.
    pub confidence: f64,
    /// Context tag.
    pub context: String,
}

/// Terminal phase of a driven session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// Stream completed: `final_response` and `session_end` were sent.
    Done,
    /// Generation failed: an `error` event was sent, no `session_end`.
    Failed,
    /// The consumer went away mid-stream; emission stopped early.
    Cancelled,
}

/// Drives one session's event sequence.
pub struct SessionDriver {
    params: SessionParams,
    config: StreamConfig,
}

impl SessionDriver {
    /// Create a driver for one session.
    #[must_use]
    pub fn new(params: SessionParams, config: StreamConfig) -> Self {
        Self { params, config }
    }

    /// Spawn the driver as a task and return the event receiver.
    ///
    /// `produce` resolves to the generated response (or a client-facing
    /// error message). Both the SSE and WebSocket transports consume the
    /// returned receiver.
    pub fn spawn<F>(self, produce: F) -> mpsc::Receiver<StreamEvent>
    where
        F: Future<Output = Result<FinalPayload, String>> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        drop(tokio::spawn(async move {
            let _ = self.drive(produce, tx).await;
        }));
        rx
    }

    /// Run the session to a terminal phase, emitting events on `tx`.
    #[instrument(skip_all, fields(session_id = %self.params.session_id))]
    pub async fn drive<F>(self, produce: F, tx: mpsc::Sender<StreamEvent>) -> SessionPhase
    where
        F: Future<Output = Result<FinalPayload, String>>,
    {
        // Start
        let opened = tx
            .send(StreamEvent::SessionStart {
                session_id: self.params.session_id.clone(),
                language: self.params.language.clone(),
            })
            .await;
        if opened.is_err() {
            return self.cancelled();
        }

        // Thinking
        if tx.send(StreamEvent::thinking(THINKING_MESSAGE)).await.is_err() {
            return self.cancelled();
        }
        tokio::time::sleep(self.config.thinking_delay).await;

        let payload = match produce.await {
            Ok(payload) => payload,
            Err(message) => {
                debug!(session_id = %self.params.session_id, "generation failed");
                let _ = tx.send(StreamEvent::error(message)).await;
                return SessionPhase::Failed;
            }
        };

        // Streaming
        for (text, progress) in WordChunks::new(&payload.message, self.config.chunk_words) {
            if tx
                .send(StreamEvent::PartialResponse { text, progress })
                .await
                .is_err()
            {
                return self.cancelled();
            }
            tokio::time::sleep(self.config.chunk_delay).await;
        }

        // Done
        let finished = tx
            .send(StreamEvent::FinalResponse {
                message: payload.message,
                confidence: payload.confidence,
                language: self.params.language.clone(),
                context: payload.context,
            })
            .await;
        if finished.is_err() {
            return self.cancelled();
        }
        if tx
            .send(StreamEvent::SessionEnd {
                session_id: self.params.session_id.clone(),
            })
            .await
            .is_err()
        {
            return self.cancelled();
        }
        SessionPhase::Done
    }

    fn cancelled(&self) -> SessionPhase {
        debug!(session_id = %self.params.session_id, "consumer gone, stopping stream");
        SessionPhase::Cancelled
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
