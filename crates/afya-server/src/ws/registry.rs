//! Live connection tracking for targeted send and broadcast.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use afya_core::ConnectionId;

use super::connection::{ClientConnection, Disconnected};

/// Tracks live WebSocket connections.
///
/// A connection handle appears at most once between register and
/// unregister; `unregister` is idempotent so the close handler and an error
/// path can both call it safely.
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ConnectionId, Arc<ClientConnection>>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Add a connection.
    pub async fn register(&self, connection: Arc<ClientConnection>) {
        let mut conns = self.connections.write().await;
        if conns.insert(connection.id.clone(), connection).is_some() {
            warn!("registered a connection id that was already present");
        }
    }

    /// Remove a connection. A no-op if it is already gone.
    pub async fn unregister(&self, id: &ConnectionId) {
        let mut conns = self.connections.write().await;
        if conns.remove(id).is_none() {
            debug!(%id, "unregister for unknown connection");
        }
    }

    /// Send a text frame to one connection.
    pub async fn send(&self, id: &ConnectionId, payload: String) -> Result<(), Disconnected> {
        let conns = self.connections.read().await;
        let conn = conns.get(id).ok_or(Disconnected)?;
        conn.send(payload)
    }

    /// Best-effort broadcast to every connection.
    ///
    /// A failure sending to one peer never prevents delivery to the
    /// others; failures are logged and counted.
    pub async fn broadcast(&self, payload: &str) -> usize {
        let conns = self.connections.read().await;
        let mut delivered = 0;
        for conn in conns.values() {
            match conn.send(payload.to_owned()) {
                Ok(()) => delivered += 1,
                Err(Disconnected) => {
                    warn!(conn_id = %conn.id, "failed to send broadcast frame");
                }
            }
        }
        debug!(delivered, total = conns.len(), "broadcast complete");
        delivered
    }

    /// Number of live connections.
    pub async fn count(&self) -> usize {
        self.connections.read().await.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
