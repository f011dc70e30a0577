//! Real-time chat over WebSocket.
//!
//! Admission runs once at the handshake, before the connection is
//! registered; a rejected peer is closed immediately with a distinct code
//! and nothing further is read or written. Each inbound `{message, ...}`
//! frame drives one full session-stream event sequence as discrete text
//! frames, produced by the same driver that feeds the SSE transport.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{RawQuery, State};
use axum::http::HeaderMap;
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge};
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};

use afya_core::ConnectionId;
use afya_core::constants::{WS_CLOSE_FORBIDDEN, WS_CLOSE_RATE_LIMITED};
use afya_stream::StreamEvent;

use crate::guard::{WsAdmission, authorize_ws, bearer_from_headers, token_from_query};
use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_DISCONNECTIONS_TOTAL};
use crate::routes::chat::{ChatRequest, spawn_chat_session};
use crate::state::AppState;
use crate::ws::connection::ClientConnection;

/// Interval between server-initiated Ping frames.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// How long a silent peer survives before being disconnected.
const IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Outbound frame buffer per connection.
const SEND_BUFFER: usize = 256;

/// GET /ws/chat — authenticated real-time chat.
pub async fn ws_chat(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let token = bearer_from_headers(&headers)
        .or_else(|| query.as_deref().and_then(token_from_query));
    let admission = authorize_ws(&state, token.as_deref(), None);
    ws.max_message_size(state.settings.server.max_ws_message_size)
        .on_upgrade(move |socket| async move {
            match admission {
                WsAdmission::Rejected(code) => close_rejected(socket, code).await,
                WsAdmission::Granted(identity) => {
                    run_chat_session(state, socket, identity.subject).await;
                }
            }
        })
}

/// Close a just-upgraded socket with the admission failure code.
pub(crate) async fn close_rejected(mut socket: WebSocket, code: u16) {
    let reason = match code {
        WS_CLOSE_RATE_LIMITED => "rate limited",
        WS_CLOSE_FORBIDDEN => "insufficient scope",
        _ => "authentication failed",
    };
    let _ = socket
        .send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.into(),
        })))
        .await;
}

/// Run one chat connection from registration through disconnect.
#[instrument(skip_all, fields(subject = %subject))]
async fn run_chat_session(state: AppState, socket: WebSocket, subject: String) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (send_tx, mut send_rx) = mpsc::channel::<String>(SEND_BUFFER);
    let conn = Arc::new(ClientConnection::new(ConnectionId::new(), subject, send_tx));

    info!(conn_id = %conn.id, "chat client connected");
    counter!(WS_CONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).increment(1.0);
    state.registry.register(conn.clone()).await;

    // Outbound forwarder with periodic Ping frames.
    let outbound_conn = conn.clone();
    let outbound = tokio::spawn(async move {
        let mut ping = tokio::time::interval(PING_INTERVAL);
        // skip the immediate first tick
        let _ = ping.tick().await;
        loop {
            tokio::select! {
                msg = send_rx.recv() => match msg {
                    Some(text) => {
                        if ws_tx.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                },
                _ = ping.tick() => {
                    if !outbound_conn.check_alive()
                        && outbound_conn.silent_for() > IDLE_TIMEOUT
                    {
                        warn!(conn_id = %outbound_conn.id, "peer unresponsive, disconnecting");
                        break;
                    }
                    if ws_tx.send(Message::Ping(vec![].into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    while let Some(Ok(msg)) = ws_rx.next().await {
        match msg {
            Message::Text(text) => {
                conn.mark_alive();
                handle_chat_frame(&state, &conn, text.as_str()).await;
            }
            Message::Binary(data) => {
                conn.mark_alive();
                if let Ok(text) = std::str::from_utf8(&data) {
                    handle_chat_frame(&state, &conn, text).await;
                }
            }
            Message::Close(_) => break,
            Message::Ping(_) | Message::Pong(_) => conn.mark_alive(),
        }
    }

    info!(conn_id = %conn.id, "chat client disconnected");
    outbound.abort();
    state.registry.unregister(&conn.id).await;
    counter!(WS_DISCONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).decrement(1.0);
}

/// Drive one session-stream sequence for an inbound chat frame.
///
/// Malformed frames get an `error` event; the connection stays open.
async fn handle_chat_frame(state: &AppState, conn: &Arc<ClientConnection>, text: &str) {
    let Ok(request) = serde_json::from_str::<ChatRequest>(text) else {
        let _ = conn.send_json(&StreamEvent::error("invalid message frame"));
        return;
    };
    let params = match request.validate() {
        Ok(params) => params,
        Err(v) => {
            let _ = conn.send_json(&StreamEvent::error(format!("validation failed: {v}")));
            return;
        }
    };

    let mut rx = spawn_chat_session(state, params, &conn.subject);
    while let Some(event) = rx.recv().await {
        if conn.send_json(&event).is_err() {
            // peer gone; the driver stops at its next send
            break;
        }
    }
}
