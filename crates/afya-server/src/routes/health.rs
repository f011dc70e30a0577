//! `/health` and `/metrics` endpoints.

use axum::extract::State;
use axum::response::Json;
use serde::Serialize;

use afya_core::constants::VERSION;

use crate::state::AppState;

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the server is running.
    pub status: String,
    /// Gateway version.
    pub version: String,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// Current WebSocket connection count.
    pub connections: usize,
    /// Response generator status.
    pub engine: String,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: VERSION.into(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        connections: state.registry.count().await,
        engine: "active".into(),
    })
}

/// GET /metrics — Prometheus text format.
pub async fn metrics(State(state): State<AppState>) -> String {
    state
        .metrics
        .as_ref()
        .map(metrics_exporter_prometheus::PrometheusHandle::render)
        .unwrap_or_default()
}
