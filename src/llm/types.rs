//! LLM types — provider-neutral generation types and errors.
//!
//! Shared by the Gemini, Anthropic and `OpenAI` clients. The assistant only
//! ever sends one prompt and reads back one block of text, so the surface is
//! a single `generate` call rather than a message list.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by LLM client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The required API key environment variable is not set or is blank.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The HTTP request to the LLM provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The LLM provider returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The LLM provider response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl crate::error::ErrorCode for LlmError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::MissingApiKey { .. } => "E_MISSING_API_KEY",
            Self::ApiRequest(_) => "E_API_REQUEST",
            Self::ApiResponse { .. } => "E_API_RESPONSE",
            Self::ApiParse(_) => "E_API_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::ApiRequest(_) | Self::ApiResponse { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// REQUEST / RESPONSE
// =============================================================================

/// Sampling knobs for one generation call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Sampling temperature. `None` leaves the provider default in place.
    pub temperature: Option<f64>,
    pub max_tokens: u32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self { temperature: None, max_tokens: 2048 }
    }
}

/// Result of one generation call.
///
/// `text` is `None` when the provider answered successfully but produced no
/// text (safety block, thinking-only output, empty candidate list).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generation {
    pub text: Option<String>,
    pub model: String,
    pub stop_reason: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl Generation {
    /// Text with surrounding whitespace ignored; `None` when nothing remains.
    #[must_use]
    pub fn non_empty_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// Join text fragments returned as separate parts/blocks. Empty input yields
/// `None` so callers can tell "no text" apart from "empty string".
pub(crate) fn join_text_parts(parts: Vec<String>) -> Option<String> {
    if parts.is_empty() { None } else { Some(parts.concat()) }
}

// =============================================================================
// LLM GENERATE TRAIT
// =============================================================================

/// Provider-neutral async trait for text generation. Enables mocking in tests.
#[async_trait::async_trait]
pub trait LlmGenerate: Send + Sync {
    /// Send a single prompt to the LLM provider.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the request fails or the response is
    /// malformed.
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<Generation, LlmError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
