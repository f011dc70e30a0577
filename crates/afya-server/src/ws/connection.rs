//! Per-client WebSocket connection state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;

use afya_core::ConnectionId;

/// Error returned when a send cannot reach the peer.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("connection disconnected")]
pub struct Disconnected;

/// A connected WebSocket client.
///
/// Outbound frames go through a bounded channel drained by the connection's
/// write task; a full or closed channel means the peer is effectively gone.
pub struct ClientConnection {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Authenticated subject this connection belongs to.
    pub subject: String,
    tx: mpsc::Sender<String>,
    /// When this connection was established.
    pub connected_at: Instant,
    is_alive: AtomicBool,
    last_seen: Mutex<Instant>,
}

impl ClientConnection {
    /// Create a connection for an authenticated client.
    #[must_use]
    pub fn new(id: ConnectionId, subject: String, tx: mpsc::Sender<String>) -> Self {
        let now = Instant::now();
        Self {
            id,
            subject,
            tx,
            connected_at: now,
            is_alive: AtomicBool::new(true),
            last_seen: Mutex::new(now),
        }
    }

    /// Enqueue a text frame for the peer.
    pub fn send(&self, message: String) -> Result<(), Disconnected> {
        self.tx.try_send(message).map_err(|_| Disconnected)
    }

    /// Serialize a value and enqueue it as a JSON text frame.
    pub fn send_json<T: serde::Serialize>(&self, value: &T) -> Result<(), Disconnected> {
        let json = serde_json::to_string(value).map_err(|_| Disconnected)?;
        self.send(json)
    }

    /// Record liveness (pong or any inbound activity).
    pub fn mark_alive(&self) {
        self.is_alive.store(true, Ordering::Relaxed);
        *self.last_seen.lock() = Instant::now();
    }

    /// Check and reset the liveness flag for the heartbeat.
    ///
    /// Returns `true` if the peer showed life since the last check.
    pub fn check_alive(&self) -> bool {
        self.is_alive.swap(false, Ordering::Relaxed)
    }

    /// Time since the peer last showed life.
    #[must_use]
    pub fn silent_for(&self) -> Duration {
        self.last_seen.lock().elapsed()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
