//! Downstream analysis-service boundary.
//!
//! The gateway forwards analysis requests to an opaque downstream service
//! and hands back whatever structured JSON it returns. Failures here are
//! degradable by contract: callers convert them into a fallback payload
//! rather than surfacing a transport error.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Errors from the downstream analysis call.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The HTTP request failed (connect, timeout, decode).
    #[error("analysis request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("analysis service returned status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },
}

/// A forwarded analysis request.
#[derive(Clone, Debug, Serialize)]
pub struct AnalysisRequest {
    /// Text to analyze.
    pub text: String,
    /// Analysis context (`healthcare`, `clinical`, `administrative`).
    pub context: String,
    /// Language tag.
    pub language: String,
}

/// Opaque downstream analysis call returning structured JSON.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Forward one analysis request.
    async fn analyze(&self, request: &AnalysisRequest)
    -> Result<serde_json::Value, UpstreamError>;
}

/// HTTP client for the analysis service.
pub struct HttpAnalysisService {
    client: reqwest::Client,
    url: String,
}

impl HttpAnalysisService {
    /// Build a client for the service at `url` with a per-call timeout.
    pub fn new(url: impl Into<String>, timeout: std::time::Duration) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisService {
    async fn analyze(
        &self,
        request: &AnalysisRequest,
    ) -> Result<serde_json::Value, UpstreamError> {
        debug!(url = %self.url, context = %request.context, "forwarding analysis request");
        let response = self.client.post(&self.url).json(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response.json().await?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
