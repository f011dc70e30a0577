//! `GatewayServer` — Axum HTTP + WebSocket server.

use std::sync::Arc;

use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use axum::{Router, middleware};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use afya_engine::{AnalysisService, ResponseGenerator};
use afya_settings::{GatewaySettings, ServerSettings};

use crate::guard;
use crate::routes;
use crate::state::AppState;
use crate::ws;

/// The Afya gateway server.
pub struct GatewayServer {
    state: AppState,
}

impl GatewayServer {
    /// Create a new server from settings and collaborator boundaries.
    #[must_use]
    pub fn new(
        settings: GatewaySettings,
        engine: Arc<dyn ResponseGenerator>,
        analysis: Option<Arc<dyn AnalysisService>>,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            state: AppState::new(settings, engine, analysis, metrics),
        }
    }

    /// Shared state handle.
    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the Axum router with all routes.
    ///
    /// Protected routes sit behind the auth-guard middleware; the WebSocket
    /// endpoints run the same guard inside the handshake so they can close
    /// with distinct codes instead of returning HTTP statuses.
    #[must_use]
    pub fn router(&self) -> Router {
        let protected = Router::new()
            .route("/chat", post(routes::chat::chat))
            .route("/claims", post(routes::claims::submit_claim))
            .route("/analyze", post(routes::analyze::analyze))
            .route_layer(middleware::from_fn_with_state(
                self.state.clone(),
                guard::require_auth,
            ));

        Router::new()
            .route("/auth/token", post(routes::auth::issue_token))
            .route("/health", get(routes::health::health))
            .route("/metrics", get(routes::health::metrics))
            .route("/ws/chat", get(ws::chat::ws_chat))
            .route("/ws/monitoring", get(ws::monitoring::ws_monitoring))
            .merge(protected)
            .layer(cors_layer(&self.state.settings.server))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }
}

fn cors_layer(settings: &ServerSettings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
