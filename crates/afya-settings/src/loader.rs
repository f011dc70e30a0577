//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`GatewaySettings::default()`]
//! 2. If the settings file exists, deep-merge its values over defaults
//! 3. Apply `AFYA_*` environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::GatewaySettings;

/// Resolve the default settings file path (`~/.afya/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".afya").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<GatewaySettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<GatewaySettings> {
    let defaults = serde_json::to_value(GatewaySettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let file: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, file)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: GatewaySettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `AFYA_*` environment variable overrides to loaded settings.
///
/// Integers must parse and fall within the given range; invalid values are
/// warned about and ignored so a typo cannot take the gateway down.
pub fn apply_env_overrides(settings: &mut GatewaySettings) {
    // ── Auth ────────────────────────────────────────────────────────
    if let Some(v) = read_env_string("AFYA_JWT_SECRET") {
        settings.auth.secret = v;
    }
    if let Some(v) = read_env_string("AFYA_JWT_ALGORITHM") {
        settings.auth.algorithm = v;
    }
    if let Some(v) = read_env_u64("AFYA_TOKEN_TTL_MINUTES", 1, 10_080) {
        settings.auth.token_ttl_minutes = v;
    }
    if let Some(v) = read_env_string("AFYA_SERVICE_ACCOUNT") {
        settings.auth.service_account = v;
    }
    if let Some(v) = read_env_string("AFYA_SERVICE_PASSWORD") {
        settings.auth.service_password = v;
    }
    if let Some(v) = read_env_string("AFYA_SERVICE_PASSWORD_HASH") {
        settings.auth.service_password_hash = Some(v);
    }

    // ── Rate limiting ───────────────────────────────────────────────
    if let Some(v) = read_env_usize("AFYA_RATE_LIMIT", 1, 1_000_000) {
        settings.rate_limit.limit = v;
    }
    if let Some(v) = read_env_u64("AFYA_RATE_LIMIT_WINDOW", 1, 86_400) {
        settings.rate_limit.window_secs = v;
    }

    // ── Server ──────────────────────────────────────────────────────
    if let Some(v) = read_env_string("AFYA_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = read_env_u16("AFYA_PORT", 1, 65_535) {
        settings.server.port = v;
    }

    // ── Stream pacing ───────────────────────────────────────────────
    if let Some(v) = read_env_usize("AFYA_CHUNK_WORDS", 1, 1_000) {
        settings.stream.chunk_words = v;
    }

    // ── Upstream ────────────────────────────────────────────────────
    if let Some(v) = read_env_string("AFYA_ANALYSIS_URL") {
        settings.upstream.analysis_url = Some(v);
    }
    if let Some(v) = read_env_u64("AFYA_ANALYSIS_TIMEOUT_MS", 100, 600_000) {
        settings.upstream.timeout_ms = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_u16(name: &str, min: u16, max: u16) -> Option<u16> {
    let val = std::env::var(name).ok()?;
    let result = parse_u16_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u16 env var, ignoring");
    }
    result
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    let val = std::env::var(name).ok()?;
    let result = parse_u64_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u64 env var, ignoring");
    }
    result
}

fn read_env_usize(name: &str, min: usize, max: usize) -> Option<usize> {
    let val = std::env::var(name).ok()?;
    let result = parse_usize_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid usize env var, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SettingsError;

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_simple_override() {
        let target = serde_json::json!({"a": 1, "b": 2});
        let source = serde_json::json!({"a": 10});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 10);
        assert_eq!(merged["b"], 2);
    }

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({
            "rateLimit": {"limit": 60, "windowSecs": 60}
        });
        let source = serde_json::json!({
            "rateLimit": {"limit": 5}
        });
        let merged = deep_merge(target, source);
        assert_eq!(merged["rateLimit"]["limit"], 5);
        assert_eq!(merged["rateLimit"]["windowSecs"], 60);
    }

    #[test]
    fn merge_array_replace() {
        let target = serde_json::json!({"corsOrigins": ["a", "b"]});
        let source = serde_json::json!({"corsOrigins": ["c"]});
        let merged = deep_merge(target, source);
        assert_eq!(merged["corsOrigins"], serde_json::json!(["c"]));
    }

    #[test]
    fn merge_null_preserves_target() {
        let target = serde_json::json!({"secret": "keep", "port": 8000});
        let source = serde_json::json!({"secret": null});
        let merged = deep_merge(target, source);
        assert_eq!(merged["secret"], "keep");
    }

    #[test]
    fn merge_new_keys_added() {
        let target = serde_json::json!({"a": 1});
        let source = serde_json::json!({"b": 2});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 2);
    }

    #[test]
    fn merge_primitive_replaces_object() {
        let target = serde_json::json!({"a": {"nested": true}});
        let source = serde_json::json!({"a": 42});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 42);
    }

    // ── load_settings_from_path ─────────────────────────────────────

    #[test]
    fn load_missing_file_returns_defaults() {
        let path = Path::new("/nonexistent/settings.json");
        let settings = load_settings_from_path(path).unwrap();
        let defaults = GatewaySettings::default();
        assert_eq!(settings.auth.secret, defaults.auth.secret);
        assert_eq!(settings.rate_limit.limit, defaults.rate_limit.limit);
    }

    #[test]
    fn load_empty_json_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{}").unwrap();

        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.server.port, 8000);
    }

    #[test]
    fn load_partial_json_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"rateLimit": {"limit": 3}, "auth": {"tokenTtlMinutes": 5}}"#,
        )
        .unwrap();

        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.rate_limit.limit, 3);
        assert_eq!(settings.auth.token_ttl_minutes, 5);
        // untouched keys keep defaults
        assert_eq!(settings.rate_limit.window_secs, 60);
        assert_eq!(settings.auth.algorithm, "HS256");
    }

    #[test]
    fn load_invalid_json_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not valid json").unwrap();

        let result = load_settings_from_path(&path);
        assert!(matches!(result.unwrap_err(), SettingsError::Json(_)));
    }

    #[test]
    fn load_hash_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"auth": {"servicePasswordHash": "c2FsdA==$ZGlnZXN0"}}"#,
        )
        .unwrap();

        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(
            settings.auth.service_password_hash.as_deref(),
            Some("c2FsdA==$ZGlnZXN0")
        );
    }

    // ── parse helpers ───────────────────────────────────────────────

    #[test]
    fn parse_u16_valid() {
        assert_eq!(parse_u16_range("8000", 1, 65535), Some(8000));
        assert_eq!(parse_u16_range("1", 1, 65535), Some(1));
        assert_eq!(parse_u16_range("65535", 1, 65535), Some(65535));
    }

    #[test]
    fn parse_u16_invalid() {
        assert_eq!(parse_u16_range("0", 1, 65535), None);
        assert_eq!(parse_u16_range("not_a_number", 1, 65535), None);
        assert_eq!(parse_u16_range("99999", 1, 65535), None);
    }

    #[test]
    fn parse_u64_range_bounds() {
        assert_eq!(parse_u64_range("60", 1, 86_400), Some(60));
        assert_eq!(parse_u64_range("0", 1, 86_400), None);
        assert_eq!(parse_u64_range("90000", 1, 86_400), None);
        assert_eq!(parse_u64_range("abc", 1, 86_400), None);
    }

    #[test]
    fn parse_usize_range_bounds() {
        assert_eq!(parse_usize_range("10", 1, 1_000), Some(10));
        assert_eq!(parse_usize_range("0", 1, 1_000), None);
        assert_eq!(parse_usize_range("1001", 1, 1_000), None);
    }
}
