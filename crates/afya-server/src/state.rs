//! Shared state accessible from Axum handlers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics_exporter_prometheus::PrometheusHandle;

use afya_auth::TokenService;
use afya_engine::{AnalysisService, ResponseGenerator};
use afya_limiter::RateLimiter;
use afya_settings::GatewaySettings;

use crate::ws::registry::ConnectionRegistry;

/// Shared state for all routes and sockets.
#[derive(Clone)]
pub struct AppState {
    /// Gateway configuration.
    pub settings: Arc<GatewaySettings>,
    /// Token issuing and validation.
    pub tokens: Arc<TokenService>,
    /// Sliding-window admission control, shared by HTTP and WebSocket paths.
    pub limiter: Arc<RateLimiter>,
    /// Response generator.
    pub engine: Arc<dyn ResponseGenerator>,
    /// Downstream analysis service, when configured.
    pub analysis: Option<Arc<dyn AnalysisService>>,
    /// Live WebSocket connections.
    pub registry: Arc<ConnectionRegistry>,
    /// Prometheus render handle, when metrics are installed.
    pub metrics: Option<PrometheusHandle>,
    /// When the server started.
    pub start_time: Instant,
}

impl AppState {
    /// Build state from settings and the collaborator boundaries.
    #[must_use]
    pub fn new(
        settings: GatewaySettings,
        engine: Arc<dyn ResponseGenerator>,
        analysis: Option<Arc<dyn AnalysisService>>,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(&settings.auth));
        let limiter = Arc::new(RateLimiter::new(
            settings.rate_limit.limit,
            Duration::from_secs(settings.rate_limit.window_secs),
        ));
        Self {
            settings: Arc::new(settings),
            tokens,
            limiter,
            engine,
            analysis,
            registry: Arc::new(ConnectionRegistry::new()),
            metrics,
            start_time: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use afya_engine::RuleEngine;

    #[test]
    fn state_wires_limiter_from_settings() {
        let settings = GatewaySettings::default();
        let state = AppState::new(settings, Arc::new(RuleEngine::new()), None, None);
        assert!(state.limiter.admit("probe").is_ok());
        assert!(state.analysis.is_none());
        assert!(state.metrics.is_none());
    }
}
