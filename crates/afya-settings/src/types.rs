//! Settings type definitions with compiled defaults.

use serde::{Deserialize, Serialize};

/// Top-level gateway settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewaySettings {
    /// Token issuing and validation.
    pub auth: AuthSettings,
    /// Sliding-window admission control.
    pub rate_limit: RateLimitSettings,
    /// HTTP/WebSocket server binding and transport limits.
    pub server: ServerSettings,
    /// Session stream pacing.
    pub stream: StreamSettings,
    /// Downstream analysis service.
    pub upstream: UpstreamSettings,
}

/// Token service configuration.
///
/// The defaults are insecure on purpose: a fixed fallback secret and a
/// well-known development password keep the gateway usable with zero
/// configuration. Override them for any real deployment.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthSettings {
    /// HMAC signing secret.
    pub secret: String,
    /// Signing algorithm name (`HS256` unless overridden).
    pub algorithm: String,
    /// Token lifetime in minutes.
    pub token_ttl_minutes: u64,
    /// The single service-account subject allowed to obtain tokens.
    pub service_account: String,
    /// Plaintext password used when no hash is configured.
    pub service_password: String,
    /// Salted password hash (`salt$digest`, both base64). Takes priority
    /// over `service_password` when set.
    pub service_password_hash: Option<String>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".into(),
            algorithm: "HS256".into(),
            token_ttl_minutes: 60,
            service_account: "afya_service".into(),
            service_password: "afya-dev-password".into(),
            service_password_hash: None,
        }
    }
}

/// Rate limiter configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RateLimitSettings {
    /// Admissions allowed per key within one window.
    pub limit: usize,
    /// Window length in seconds.
    pub window_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            limit: 60,
            window_secs: 60,
        }
    }
}

/// Server binding and transport configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Host to bind.
    pub host: String,
    /// Port to bind (0 for auto-assign).
    pub port: u16,
    /// Origins allowed by CORS.
    pub cors_origins: Vec<String>,
    /// Maximum inbound WebSocket message size in bytes.
    pub max_ws_message_size: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            cors_origins: vec![
                "https://afya.brainsait.com".into(),
                "http://localhost:3000".into(),
            ],
            max_ws_message_size: 64 * 1024,
        }
    }
}

/// Session stream pacing configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreamSettings {
    /// Words per `partial_response` chunk.
    pub chunk_words: usize,
    /// Delay after the `thinking` event, in milliseconds.
    pub thinking_delay_ms: u64,
    /// Delay between chunks, in milliseconds.
    pub chunk_delay_ms: u64,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            chunk_words: 10,
            thinking_delay_ms: 500,
            chunk_delay_ms: 10,
        }
    }
}

/// Downstream analysis service configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpstreamSettings {
    /// Base URL of the analysis service; `None` disables the integration.
    pub analysis_url: Option<String>,
    /// Per-call timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            analysis_url: None,
            timeout_ms: 10_000,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_roundtrip() {
        let settings = GatewaySettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let back: GatewaySettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.auth.secret, settings.auth.secret);
        assert_eq!(back.rate_limit.limit, settings.rate_limit.limit);
        assert_eq!(back.server.port, settings.server.port);
        assert_eq!(back.stream.chunk_words, settings.stream.chunk_words);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: GatewaySettings =
            serde_json::from_str(r#"{"rateLimit": {"limit": 5}}"#).unwrap();
        assert_eq!(settings.rate_limit.limit, 5);
        assert_eq!(settings.rate_limit.window_secs, 60);
        assert_eq!(settings.auth.algorithm, "HS256");
    }

    #[test]
    fn camel_case_keys_on_the_wire() {
        let json = serde_json::to_value(GatewaySettings::default()).unwrap();
        assert!(json["auth"]["tokenTtlMinutes"].is_number());
        assert!(json["rateLimit"]["windowSecs"].is_number());
        assert!(json["server"]["corsOrigins"].is_array());
    }

    #[test]
    fn default_cors_includes_localhost() {
        let settings = GatewaySettings::default();
        assert!(
            settings
                .server
                .cors_origins
                .iter()
                .any(|o| o.contains("localhost"))
        );
    }
}
