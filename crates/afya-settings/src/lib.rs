//! # afya-settings
//!
//! Configuration management with layered sources for the Afya gateway.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`GatewaySettings::default()`]
//! 2. **File** — an optional JSON settings file (deep-merged over defaults)
//! 3. **Environment variables** — `AFYA_*` overrides (highest priority)
//!
//! The compiled defaults are deliberately insecure so the gateway works out
//! of the box: the JWT secret is a fixed placeholder and the service account
//! uses a well-known development password. Every deployment must override
//! `AFYA_JWT_SECRET` and the service credentials before going to production.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path};
pub use types::{
    AuthSettings, GatewaySettings, RateLimitSettings, ServerSettings, StreamSettings,
    UpstreamSettings,
};

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
