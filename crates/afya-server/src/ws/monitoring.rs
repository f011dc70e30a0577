//! Role-gated monitoring socket.
//!
//! Requires the `monitor` scope; a valid token without it is closed with
//! its own code, distinct from the unauthenticated and rate-limited codes.
//! Once attached, the server pushes a status frame every few seconds until
//! the peer disconnects.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{RawQuery, State};
use axum::http::HeaderMap;
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge};
use tokio::sync::mpsc;
use tracing::{info, instrument};

use afya_core::ConnectionId;
use afya_core::constants::MONITOR_SCOPE;

use crate::guard::{WsAdmission, authorize_ws, bearer_from_headers, token_from_query};
use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_DISCONNECTIONS_TOTAL};
use crate::state::AppState;
use crate::ws::chat::close_rejected;
use crate::ws::connection::ClientConnection;

/// How often a status frame is pushed.
const STATUS_INTERVAL: Duration = Duration::from_secs(3);

/// GET /ws/monitoring — scope-gated live status feed.
pub async fn ws_monitoring(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let token = bearer_from_headers(&headers)
        .or_else(|| query.as_deref().and_then(token_from_query));
    let admission = authorize_ws(&state, token.as_deref(), Some(MONITOR_SCOPE));
    ws.max_message_size(state.settings.server.max_ws_message_size)
        .on_upgrade(move |socket| async move {
            match admission {
                WsAdmission::Rejected(code) => close_rejected(socket, code).await,
                WsAdmission::Granted(identity) => {
                    run_monitoring_session(state, socket, identity.subject).await;
                }
            }
        })
}

/// Push status frames until the peer goes away.
#[instrument(skip_all, fields(subject = %subject))]
async fn run_monitoring_session(state: AppState, socket: WebSocket, subject: String) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (send_tx, mut send_rx) = mpsc::channel::<String>(64);
    let conn = Arc::new(ClientConnection::new(ConnectionId::new(), subject, send_tx));

    info!(conn_id = %conn.id, "monitoring client connected");
    counter!(WS_CONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).increment(1.0);
    state.registry.register(conn.clone()).await;

    let mut interval = tokio::time::interval(STATUS_INTERVAL);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let frame = status_frame(&state, &conn.subject).await;
                if conn.send(frame).is_err() {
                    break;
                }
            }
            outbound = send_rx.recv() => match outbound {
                Some(text) => {
                    if ws_tx.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
            inbound = ws_rx.next() => match inbound {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => conn.mark_alive(),
            },
        }
    }

    info!(conn_id = %conn.id, "monitoring client disconnected");
    state.registry.unregister(&conn.id).await;
    counter!(WS_DISCONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).decrement(1.0);
}

async fn status_frame(state: &AppState, subject: &str) -> String {
    serde_json::json!({
        "type": "monitor_status",
        "data": {
            "uptime_secs": state.start_time.elapsed().as_secs(),
            "active_connections": state.registry.count().await,
            "engine": "active",
        },
        "user": subject,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })
    .to_string()
}
