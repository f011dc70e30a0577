//! POST /chat — streaming chat over server-sent events.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderName, HeaderValue, header};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use metrics::counter;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;

use afya_auth::Identity;
use afya_core::{SessionId, ValidationError};
use afya_engine::Language;
use afya_stream::{FinalPayload, SessionDriver, SessionParams, StreamConfig, StreamEvent};

use crate::errors::ApiError;
use crate::metrics::CHAT_SESSIONS_TOTAL;
use crate::state::AppState;
use crate::validation::{SESSION_ID_RE, check_len, check_one_of, check_pattern};

/// Default context tag when a request does not supply one.
const DEFAULT_CONTEXT: &str = "healthcare";

/// Inbound chat request, shared by the SSE route and the WebSocket frames.
#[derive(Clone, Debug, Deserialize)]
pub struct ChatRequest {
    /// Message text, 1-1000 characters.
    #[serde(default)]
    pub message: String,
    /// Response language, `en` or `ar`.
    #[serde(default = "default_language")]
    pub language: String,
    /// Optional client-supplied session ID.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Optional context tag, up to 500 characters.
    #[serde(default)]
    pub context: Option<String>,
}

fn default_language() -> String {
    "en".to_owned()
}

/// A validated chat request.
#[derive(Clone, Debug)]
pub struct ChatParams {
    /// Message text.
    pub message: String,
    /// Parsed language.
    pub language: Language,
    /// Session ID, generated when the client supplied none.
    pub session_id: SessionId,
    /// Context tag.
    pub context: String,
}

impl ChatRequest {
    /// Validate field constraints and normalize into [`ChatParams`].
    pub fn validate(&self) -> Result<ChatParams, ValidationError> {
        let mut errors = ValidationError::new();
        check_len(&mut errors, "message", &self.message, 1, 1000);
        check_one_of(&mut errors, "language", &self.language, &["en", "ar"]);
        if let Some(session_id) = &self.session_id {
            check_pattern(&mut errors, "session_id", session_id, &SESSION_ID_RE);
        }
        if let Some(context) = &self.context {
            check_len(&mut errors, "context", context, 0, 500);
        }
        errors.into_result()?;

        // language is vetted above; the fallback is unreachable
        let language = Language::parse(&self.language).unwrap_or(Language::En);
        Ok(ChatParams {
            message: self.message.clone(),
            language,
            session_id: self
                .session_id
                .as_deref()
                .map_or_else(SessionId::new, SessionId::from),
            context: self
                .context
                .clone()
                .unwrap_or_else(|| DEFAULT_CONTEXT.to_owned()),
        })
    }
}

/// Start a session driver for a validated chat request.
///
/// Used by both transports: the SSE route adapts the receiver into an
/// event-stream body, the WebSocket path forwards events as text frames.
pub(crate) fn spawn_chat_session(
    state: &AppState,
    params: ChatParams,
    subject: &str,
) -> mpsc::Receiver<StreamEvent> {
    counter!(CHAT_SESSIONS_TOTAL).increment(1);
    info!(
        subject,
        session_id = %params.session_id,
        language = %params.language,
        "chat session started"
    );

    let driver = SessionDriver::new(
        SessionParams {
            session_id: params.session_id,
            language: params.language.as_str().to_owned(),
        },
        StreamConfig::from(&state.settings.stream),
    );
    let engine = state.engine.clone();
    driver.spawn(async move {
        let generated = engine.generate(&params.message, params.language, Some(&params.context));
        Ok(FinalPayload {
            message: generated.message,
            confidence: generated.confidence,
            context: params.context,
        })
    })
}

/// POST /chat
///
/// Responds with a `text/event-stream` body whose frames follow the session
/// stream protocol; caching and proxy buffering are disabled.
pub async fn chat(
    State(state): State<AppState>,
    identity: axum::Extension<Identity>,
    Json(body): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    let params = body.validate().map_err(ApiError::from)?;
    let rx = spawn_chat_session(&state, params, &identity.subject);

    let stream = ReceiverStream::new(rx).map(|event| Event::default().json_data(&event));
    let mut response = Sse::new(stream).into_response();
    let headers = response.headers_mut();
    let _ = headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    let _ = headers.insert(
        HeaderName::from_static("x-accel-buffering"),
        HeaderValue::from_static("no"),
    );
    Ok(response)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn request(message: &str, language: &str) -> ChatRequest {
        ChatRequest {
            message: message.into(),
            language: language.into(),
            session_id: None,
            context: None,
        }
    }

    #[test]
    fn valid_request_normalizes() {
        let params = request("Am I eligible?", "en").validate().unwrap();
        assert_eq!(params.message, "Am I eligible?");
        assert_eq!(params.language, Language::En);
        assert_eq!(params.context, DEFAULT_CONTEXT);
        assert!(!params.session_id.as_str().is_empty());
    }

    #[test]
    fn empty_message_rejected() {
        let err = request("", "en").validate().unwrap_err();
        assert_eq!(err.fields[0].field, "message");
    }

    #[test]
    fn oversized_message_rejected() {
        let err = request(&"x".repeat(1001), "en").validate().unwrap_err();
        assert_eq!(err.fields[0].field, "message");
    }

    #[test]
    fn unknown_language_rejected() {
        let err = request("hello", "fr").validate().unwrap_err();
        assert_eq!(err.fields[0].field, "language");
    }

    #[test]
    fn bad_session_id_rejected() {
        let mut req = request("hello", "en");
        req.session_id = Some("has spaces!".into());
        let err = req.validate().unwrap_err();
        assert_eq!(err.fields[0].field, "session_id");
    }

    #[test]
    fn client_session_id_is_kept() {
        let mut req = request("hello", "ar");
        req.session_id = Some("mobile-42".into());
        let params = req.validate().unwrap();
        assert_eq!(params.session_id.as_str(), "mobile-42");
        assert_eq!(params.language, Language::Ar);
    }

    #[test]
    fn oversized_context_rejected() {
        let mut req = request("hello", "en");
        req.context = Some("c".repeat(501));
        let err = req.validate().unwrap_err();
        assert_eq!(err.fields[0].field, "context");
    }

    #[test]
    fn multiple_failures_reported_together() {
        let mut req = request("", "fr");
        req.session_id = Some(String::new());
        let err = req.validate().unwrap_err();
        let fields: Vec<&str> = err.fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["message", "language", "session_id"]);
    }

    #[test]
    fn language_defaults_to_english() {
        let req: ChatRequest = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert_eq!(req.language, "en");
    }
}
