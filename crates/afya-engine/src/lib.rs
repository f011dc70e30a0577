//! # afya-engine
//!
//! Response generation for the Afya gateway.
//!
//! Two collaborator boundaries live here:
//!
//! - [`ResponseGenerator`] — a pure function from (message, language,
//!   context) to response text plus confidence/category metadata. The
//!   shipped implementation is [`RuleEngine`], a keyword-scored rule engine
//!   with bilingual response pools.
//! - [`AnalysisService`] — an opaque async downstream call returning
//!   structured JSON, with [`HttpAnalysisService`] as the HTTP client.
//!   Callers treat any failure as degradable, not fatal.

#![deny(unsafe_code)]

pub mod analysis;
pub mod generator;
pub mod rules;
pub mod types;

pub use analysis::{AnalysisRequest, AnalysisService, HttpAnalysisService, UpstreamError};
pub use generator::ResponseGenerator;
pub use rules::RuleEngine;
pub use types::{Category, GeneratedResponse, Language};

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
