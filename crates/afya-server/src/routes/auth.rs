//! POST /auth/token — credential exchange.

use axum::Form;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use afya_auth::AuthError;
use afya_core::GatewayError;

use crate::errors::ApiError;
use crate::metrics::{RATE_LIMITED_TOTAL, TOKENS_ISSUED_TOTAL};
use crate::state::AppState;

/// Credential form, OAuth2 password-grant shaped.
#[derive(Debug, Deserialize)]
pub struct TokenForm {
    /// Service-account subject.
    pub username: String,
    /// Service-account password.
    pub password: String,
    /// Optional space-separated scopes.
    #[serde(default)]
    pub scope: String,
}

/// Successful token response.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// The signed bearer token.
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
}

/// POST /auth/token
///
/// Bad credentials answer 400; successful logins are rate-limited keyed by
/// username, so a stolen password cannot mint tokens without bound.
pub async fn issue_token(
    State(state): State<AppState>,
    Form(form): Form<TokenForm>,
) -> Result<Response, ApiError> {
    let scopes: Vec<String> = form.scope.split_whitespace().map(str::to_owned).collect();

    let issued = match state.tokens.issue(&form.username, &form.password, scopes) {
        Ok(issued) => issued,
        Err(AuthError::Unauthenticated) => {
            warn!(username = %form.username, "credential check failed");
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Incorrect username or password"})),
            )
                .into_response());
        }
        Err(AuthError::Signing(e)) => {
            return Err(ApiError::with_path(
                GatewayError::internal(format!("token signing failed: {e}")),
                "/auth/token",
            ));
        }
    };

    state.limiter.admit(&form.username).map_err(|_| {
        counter!(RATE_LIMITED_TOTAL).increment(1);
        ApiError::new(GatewayError::RateLimited)
    })?;

    counter!(TOKENS_ISSUED_TOTAL).increment(1);
    info!(username = %form.username, "token issued");
    Ok(Json(TokenResponse {
        access_token: issued.access_token,
        token_type: "bearer".into(),
    })
    .into_response())
}
