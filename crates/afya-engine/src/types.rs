//! Generator input/output types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Supported response languages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English.
    En,
    /// Arabic.
    Ar,
}

impl Language {
    /// Parse a language tag. Only `en` and `ar` are recognized.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "en" => Some(Self::En),
            "ar" => Some(Self::Ar),
            _ => None,
        }
    }

    /// The wire tag for this language.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ar => "ar",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Topic category a message was matched to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Coverage and eligibility questions.
    Eligibility,
    /// Claim submission and status questions.
    Claims,
    /// Prior-authorization questions.
    PreAuthorization,
    /// Exchange-platform connectivity questions.
    Platform,
    /// Urgent-care escalations.
    Emergency,
    /// Anything that matched no category.
    General,
}

impl Category {
    /// The wire tag for this category.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eligibility => "eligibility",
            Self::Claims => "claims",
            Self::PreAuthorization => "pre_authorization",
            Self::Platform => "platform",
            Self::Emergency => "emergency",
            Self::General => "general",
        }
    }
}

/// A generated response with its metadata.
#[derive(Clone, Debug)]
pub struct GeneratedResponse {
    /// Response text in the requested language.
    pub message: String,
    /// Match confidence in `[0, 1]`.
    pub confidence: f64,
    /// Category the message was matched to.
    pub category: Category,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
