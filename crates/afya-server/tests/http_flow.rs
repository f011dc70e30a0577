//! End-to-end HTTP flows through the full router.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use afya_engine::RuleEngine;
use afya_server::GatewayServer;
use afya_settings::{GatewaySettings, RateLimitSettings, StreamSettings};

fn test_settings(limit: usize) -> GatewaySettings {
    GatewaySettings {
        rate_limit: RateLimitSettings {
            limit,
            window_secs: 60,
        },
        stream: StreamSettings {
            chunk_words: 4,
            thinking_delay_ms: 0,
            chunk_delay_ms: 0,
        },
        ..GatewaySettings::default()
    }
}

fn make_router(limit: usize) -> Router {
    GatewayServer::new(test_settings(limit), Arc::new(RuleEngine::new()), None, None).router()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn obtain_token(app: &Router) -> String {
    let req = Request::builder()
        .method("POST")
        .uri("/auth/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=afya_service&password=afya-dev-password"))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let parsed = body_json(resp).await;
    assert_eq!(parsed["token_type"], "bearer");
    parsed["access_token"].as_str().unwrap().to_owned()
}

fn chat_request(token: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

/// Parse the `data:` frames of an SSE body into JSON events.
fn sse_events(body: &str) -> Vec<serde_json::Value> {
    body.split("\n\n")
        .filter_map(|frame| frame.trim().strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).unwrap())
        .collect()
}

#[tokio::test]
async fn token_then_chat_streams_full_sequence() {
    let app = make_router(30);
    let token = obtain_token(&app).await;

    let resp = app
        .clone()
        .oneshot(chat_request(
            &token,
            r#"{"message": "Am I eligible?", "language": "en"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );
    assert_eq!(resp.headers().get(header::CACHE_CONTROL).unwrap(), "no-cache");
    assert_eq!(resp.headers().get("x-accel-buffering").unwrap(), "no");

    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let events = sse_events(std::str::from_utf8(&bytes).unwrap());

    let kinds: Vec<&str> = events
        .iter()
        .map(|e| e["type"].as_str().unwrap())
        .collect();
    assert_eq!(kinds[0], "session_start");
    assert!(kinds.contains(&"partial_response"));
    assert_eq!(kinds[kinds.len() - 2], "final_response");
    assert_eq!(kinds[kinds.len() - 1], "session_end");

    // progress is monotone and ends at 1.0
    let mut prev = 0.0;
    let mut last = 0.0;
    for ev in &events {
        if ev["type"] == "partial_response" {
            let p = ev["progress"].as_f64().unwrap();
            assert!(p >= prev);
            prev = p;
            last = p;
        }
    }
    assert!((last - 1.0).abs() < f64::EPSILON);

    // start and end carry the same session id
    assert_eq!(events[0]["session_id"], events[kinds.len() - 1]["session_id"]);
}

#[tokio::test]
async fn chat_without_authorization_is_401() {
    let app = make_router(30);
    let req = Request::builder()
        .method("POST")
        .uri("/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"message": "Am I eligible?"}"#))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        resp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
}

#[tokio::test]
async fn chat_with_tampered_token_is_401() {
    let app = make_router(30);
    let token = obtain_token(&app).await;
    let tampered = format!("{token}x");
    let resp = app
        .oneshot(chat_request(&tampered, r#"{"message": "hello"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bad_credentials_return_400() {
    let app = make_router(30);
    let req = Request::builder()
        .method("POST")
        .uri("/auth/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=afya_service&password=wrong"))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let parsed = body_json(resp).await;
    assert_eq!(parsed["error"], "Incorrect username or password");
}

#[tokio::test]
async fn unknown_username_also_returns_400() {
    let app = make_router(30);
    let req = Request::builder()
        .method("POST")
        .uri("/auth/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=intruder&password=afya-dev-password"))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn quota_exhaustion_returns_429() {
    // limit 2: the token grant consumes one admission for the subject key,
    // the first chat the second, the next chat is over quota
    let app = make_router(2);
    let token = obtain_token(&app).await;

    let ok = app
        .clone()
        .oneshot(chat_request(&token, r#"{"message": "hello"}"#))
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    // drain the stream so the session completes
    let _ = axum::body::to_bytes(ok.into_body(), 1024 * 1024).await;

    let limited = app
        .clone()
        .oneshot(chat_request(&token, r#"{"message": "hello"}"#))
        .await
        .unwrap();
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    let parsed = body_json(limited).await;
    assert_eq!(parsed["code"], "RATE_LIMITED");
}

#[tokio::test]
async fn invalid_chat_body_is_422_with_field_detail() {
    let app = make_router(30);
    let token = obtain_token(&app).await;
    let resp = app
        .oneshot(chat_request(
            &token,
            r#"{"message": "hello", "language": "fr"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let parsed = body_json(resp).await;
    assert_eq!(parsed["code"], "VALIDATION_FAILED");
    assert_eq!(parsed["detail"][0]["field"], "language");
}

#[tokio::test]
async fn empty_chat_body_reports_missing_message() {
    let app = make_router(30);
    let token = obtain_token(&app).await;
    let resp = app.oneshot(chat_request(&token, "{}")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let parsed = body_json(resp).await;
    assert_eq!(parsed["detail"][0]["field"], "message");
}

#[tokio::test]
async fn claim_submission_roundtrip() {
    let app = make_router(30);
    let token = obtain_token(&app).await;
    let req = Request::builder()
        .method("POST")
        .uri("/claims")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{
                "patient_id": "1234567890",
                "provider_id": "PRV01",
                "procedure_codes": ["99213"],
                "diagnosis_codes": ["E11.9"],
                "amount": 450.0,
                "service_date": "2026-08-01"
            }"#,
        ))
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let parsed = body_json(resp).await;
    assert_eq!(parsed["status"], "processed");
    assert_eq!(parsed["exchange_status"], "submitted");
    assert!(parsed["claim_id"].is_string());
}

#[tokio::test]
async fn invalid_claim_is_422_per_field() {
    let app = make_router(30);
    let token = obtain_token(&app).await;
    let req = Request::builder()
        .method("POST")
        .uri("/claims")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{"patient_id": "123", "provider_id": "x", "procedure_codes": [],
                "diagnosis_codes": [], "amount": 0, "service_date": "bad"}"#,
        ))
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let parsed = body_json(resp).await;
    let fields: Vec<&str> = parsed["detail"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"patient_id"));
    assert!(fields.contains(&"amount"));
    assert!(fields.contains(&"service_date"));
}

/// Stub downstream that either answers with fixed JSON or fails.
struct StubAnalysis {
    healthy: bool,
}

#[async_trait::async_trait]
impl afya_engine::AnalysisService for StubAnalysis {
    async fn analyze(
        &self,
        _request: &afya_engine::AnalysisRequest,
    ) -> Result<serde_json::Value, afya_engine::UpstreamError> {
        if self.healthy {
            Ok(serde_json::json!({"analysis": "no anomalies", "confidence": 0.93}))
        } else {
            Err(afya_engine::UpstreamError::Status { status: 503 })
        }
    }
}

fn analyze_request(token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{"text": "patient presents with fever", "context": "clinical"}"#,
        ))
        .unwrap()
}

#[tokio::test]
async fn analyze_forwards_downstream_result() {
    let app = GatewayServer::new(
        test_settings(30),
        Arc::new(RuleEngine::new()),
        Some(Arc::new(StubAnalysis { healthy: true })),
        None,
    )
    .router();
    let token = obtain_token(&app).await;

    let resp = app.oneshot(analyze_request(&token)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let parsed = body_json(resp).await;
    assert_eq!(parsed["fallback"], false);
    assert_eq!(parsed["result"]["analysis"], "no anomalies");
    assert_eq!(parsed["context"], "clinical");
}

#[tokio::test]
async fn analyze_degrades_on_downstream_failure() {
    let app = GatewayServer::new(
        test_settings(30),
        Arc::new(RuleEngine::new()),
        Some(Arc::new(StubAnalysis { healthy: false })),
        None,
    )
    .router();
    let token = obtain_token(&app).await;

    let resp = app.oneshot(analyze_request(&token)).await.unwrap();
    // a 503 downstream never becomes a transport failure
    assert_eq!(resp.status(), StatusCode::OK);
    let parsed = body_json(resp).await;
    assert_eq!(parsed["fallback"], true);
    assert_eq!(parsed["confidence"], 0.0);
}

#[tokio::test]
async fn analyze_degrades_to_fallback_without_downstream() {
    let app = make_router(30);
    let token = obtain_token(&app).await;
    let req = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"text": "patient presents with fever"}"#))
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    // downstream outage degrades gracefully, never a transport failure
    assert_eq!(resp.status(), StatusCode::OK);
    let parsed = body_json(resp).await;
    assert_eq!(parsed["fallback"], true);
    assert!(parsed["timestamp"].is_string());
}

#[tokio::test]
async fn health_is_public() {
    let app = make_router(30);
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
