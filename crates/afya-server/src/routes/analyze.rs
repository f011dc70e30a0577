//! POST /analyze — downstream analysis pass-through with graceful fallback.
//!
//! A failing downstream call degrades to a structured fallback payload
//! instead of surfacing a transport error, so a single outage never takes
//! the endpoint down.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use metrics::counter;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use afya_auth::Identity;
use afya_core::ValidationError;
use afya_engine::AnalysisRequest;

use crate::errors::ApiError;
use crate::metrics::ANALYSIS_FALLBACKS_TOTAL;
use crate::state::AppState;
use crate::validation::{check_len, check_one_of};

/// Inbound analysis request.
#[derive(Clone, Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Text to analyze, 1-5000 characters.
    #[serde(default)]
    pub text: String,
    /// Analysis context.
    #[serde(default = "default_context")]
    pub context: String,
    /// Language tag.
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_context() -> String {
    "healthcare".to_owned()
}

fn default_language() -> String {
    "en".to_owned()
}

impl AnalyzeRequest {
    /// Validate field constraints.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        check_len(&mut errors, "text", &self.text, 1, 5000);
        check_one_of(
            &mut errors,
            "context",
            &self.context,
            &["healthcare", "clinical", "administrative"],
        );
        check_one_of(&mut errors, "language", &self.language, &["en", "ar"]);
        errors.into_result()
    }
}

/// POST /analyze
pub async fn analyze(
    State(state): State<AppState>,
    identity: axum::Extension<Identity>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Response, ApiError> {
    body.validate().map_err(ApiError::from)?;

    let request = AnalysisRequest {
        text: body.text,
        context: body.context,
        language: body.language,
    };

    let outcome = match &state.analysis {
        Some(service) => service.analyze(&request).await.map_err(|e| e.to_string()),
        None => {
            debug!("analysis service not configured");
            Err("analysis service not configured".to_owned())
        }
    };

    let response = match outcome {
        Ok(result) => json!({
            "result": result,
            "context": request.context,
            "fallback": false,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }),
        Err(reason) => {
            warn!(
                subject = %identity.subject,
                reason,
                "analysis degraded to fallback"
            );
            counter!(ANALYSIS_FALLBACKS_TOTAL).increment(1);
            json!({
                "analysis": "Analysis is temporarily unavailable; please retry shortly.",
                "context": request.context,
                "confidence": 0.0,
                "fallback": true,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            })
        }
    };
    Ok(Json(response).into_response())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
