//! Shared wire constants.

/// WebSocket close code sent when the handshake carried no valid token.
pub const WS_CLOSE_UNAUTHENTICATED: u16 = 4401;

/// WebSocket close code sent when the caller lacks a required scope.
pub const WS_CLOSE_FORBIDDEN: u16 = 4403;

/// WebSocket close code sent when the sliding-window quota was exceeded.
pub const WS_CLOSE_RATE_LIMITED: u16 = 4429;

/// Rate-limit key used when neither a subject nor a peer address is known.
pub const ANONYMOUS_KEY: &str = "anonymous";

/// Token scope required to attach to the monitoring socket.
pub const MONITOR_SCOPE: &str = "monitor";

/// Gateway version reported by `/health`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
