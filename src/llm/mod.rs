//! LLM — multi-provider text generation adapter for the assistant.
//!
//! DESIGN
//! ======
//! Configuration comes from environment variables (see [`config::LlmConfig`]).
//! The `LlmClient` dispatches to Gemini, Anthropic or `OpenAI` based on
//! `LLM_PROVIDER`. Callers depend on the [`LlmGenerate`] trait so tests can
//! substitute a mock and the credential never has to be read at call time.

pub mod anthropic;
pub mod config;
pub mod gemini;
pub mod openai;
pub mod types;

use std::time::Duration;

use config::{LlmConfig, LlmProviderKind, LlmTimeouts};
pub use types::LlmGenerate;
use types::{GenerateOptions, Generation, LlmError};

// =============================================================================
// CLIENT DISPATCH
// =============================================================================

/// Concrete LLM client that dispatches to the configured provider.
///
/// Configured from environment variables by [`LlmClient::from_env`].
pub struct LlmClient {
    inner: LlmProvider,
    model: String,
}

enum LlmProvider {
    Gemini(gemini::GeminiClient),
    Anthropic(anthropic::AnthropicClient),
    OpenAi(openai::OpenAiClient),
}

impl LlmClient {
    /// Build an LLM client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or the HTTP client fails.
    pub fn from_env() -> Result<Self, LlmError> {
        let config = LlmConfig::from_env()?;
        Self::from_config(config)
    }

    /// Build an LLM client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let model = config.model.clone();
        let inner = match config.provider {
            LlmProviderKind::Gemini => {
                LlmProvider::Gemini(gemini::GeminiClient::new(config.api_key, config.base_url, config.timeouts)?)
            }
            LlmProviderKind::Anthropic => LlmProvider::Anthropic(anthropic::AnthropicClient::new(
                config.api_key,
                config.base_url,
                config.timeouts,
            )?),
            LlmProviderKind::OpenAi => LlmProvider::OpenAi(openai::OpenAiClient::new(
                config.api_key,
                config.openai_mode,
                config.base_url,
                config.timeouts,
            )?),
        };
        Ok(Self { inner, model })
    }

    /// Return the configured model name (e.g. `"gemini-2.5-flash"`).
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Short provider label for logs.
    #[must_use]
    pub fn provider(&self) -> &'static str {
        match &self.inner {
            LlmProvider::Gemini(_) => "gemini",
            LlmProvider::Anthropic(_) => "anthropic",
            LlmProvider::OpenAi(_) => "openai",
        }
    }
}

#[async_trait::async_trait]
impl LlmGenerate for LlmClient {
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<Generation, LlmError> {
        match &self.inner {
            LlmProvider::Gemini(c) => c.generate(&self.model, prompt, options).await,
            LlmProvider::Anthropic(c) => c.generate(&self.model, prompt, options).await,
            LlmProvider::OpenAi(c) => c.generate(&self.model, prompt, options).await,
        }
    }
}

/// Shared `reqwest` client construction with the configured timeouts.
fn build_http_client(timeouts: LlmTimeouts) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeouts.request_secs))
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .build()
        .map_err(|e| LlmError::HttpClientBuild(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::OpenAiApiMode;

    fn config(provider: LlmProviderKind) -> LlmConfig {
        LlmConfig {
            provider,
            api_key: "secret".into(),
            model: "test-model".into(),
            openai_mode: OpenAiApiMode::Responses,
            base_url: "https://example.test".into(),
            timeouts: LlmTimeouts { request_secs: 5, connect_secs: 1 },
        }
    }

    #[test]
    fn from_config_selects_provider() {
        for (kind, label) in [
            (LlmProviderKind::Gemini, "gemini"),
            (LlmProviderKind::Anthropic, "anthropic"),
            (LlmProviderKind::OpenAi, "openai"),
        ] {
            let client = LlmClient::from_config(config(kind)).unwrap();
            assert_eq!(client.provider(), label);
            assert_eq!(client.model(), "test-model");
        }
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_request_error() {
        let mut cfg = config(LlmProviderKind::Gemini);
        // Port 9 (discard) on loopback is never an HTTP server in CI.
        cfg.base_url = "http://127.0.0.1:9".into();
        let client = LlmClient::from_config(cfg).unwrap();
        let err = client
            .generate("hi", &GenerateOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::ApiRequest(_)));
    }
}
