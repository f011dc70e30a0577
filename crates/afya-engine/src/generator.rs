//! The response-generator boundary.

use crate::types::{GeneratedResponse, Language};

/// A pure function from (message, language, context) to a response.
///
/// Implementations must be cheap and side-effect free; the session driver
/// calls this once per session and streams the result.
pub trait ResponseGenerator: Send + Sync {
    /// Generate a response for one inbound message.
    fn generate(
        &self,
        message: &str,
        language: Language,
        context: Option<&str>,
    ) -> GeneratedResponse;
}
