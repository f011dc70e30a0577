//! Prometheus metrics recorder and metric-name constants.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the Prometheus metrics recorder (global).
///
/// Returns the `PrometheusHandle` used to render the `/metrics` endpoint.
/// Must be called once at server startup before any metrics are recorded.
pub fn install_recorder() -> PrometheusHandle {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install metrics recorder");
    info!("prometheus metrics recorder installed");
    handle
}

// Metric name constants to avoid typos across modules.

/// Tokens issued (counter).
pub const TOKENS_ISSUED_TOTAL: &str = "tokens_issued_total";
/// Guard rejections for bad/missing credentials (counter).
pub const AUTH_FAILURES_TOTAL: &str = "auth_failures_total";
/// Guard rejections for exhausted quotas (counter).
pub const RATE_LIMITED_TOTAL: &str = "rate_limited_total";
/// Chat sessions started across both transports (counter).
pub const CHAT_SESSIONS_TOTAL: &str = "chat_sessions_total";
/// WebSocket connections opened (counter).
pub const WS_CONNECTIONS_TOTAL: &str = "ws_connections_total";
/// WebSocket disconnections (counter).
pub const WS_DISCONNECTIONS_TOTAL: &str = "ws_disconnections_total";
/// Active WebSocket connections (gauge).
pub const WS_CONNECTIONS_ACTIVE: &str = "ws_connections_active";
/// Downstream analysis calls that degraded to a fallback (counter).
pub const ANALYSIS_FALLBACKS_TOTAL: &str = "analysis_fallbacks_total";
