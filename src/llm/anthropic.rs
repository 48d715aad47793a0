//! Anthropic Messages API client.
//!
//! Thin HTTP wrapper for `/v1/messages`. The prompt is sent as a single user
//! turn. Pure parsing in `parse_response` for testability.

use super::config::LlmTimeouts;
use super::types::{GenerateOptions, Generation, LlmError, join_text_parts};

pub(crate) const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

// =============================================================================
// CLIENT
// =============================================================================

pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    url: String,
}

impl AnthropicClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: String, url: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = super::build_http_client(timeouts)?;
        Ok(Self { http, api_key, url })
    }

    /// # Errors
    ///
    /// Returns an error on transport failure, non-200 status or an
    /// unparseable body.
    pub async fn generate(&self, model: &str, prompt: &str, options: &GenerateOptions) -> Result<Generation, LlmError> {
        let messages = [ApiMessage { role: "user", content: prompt }];
        let body = ApiRequest {
            model,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            messages: &messages,
        };

        let response = self
            .http
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        if status != 200 {
            return Err(LlmError::ApiResponse { status, body: text });
        }

        parse_response(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    messages: &'a [ApiMessage<'a>],
}

#[derive(serde::Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(serde::Deserialize)]
struct ApiResponse {
    content: Vec<ResponseBlock>,
    model: String,
    #[serde(default)]
    stop_reason: Option<String>,
    usage: Usage,
}

#[derive(serde::Deserialize)]
#[serde(tag = "type")]
enum ResponseBlock {
    #[serde(rename = "text")]
    Text { text: String },
    /// Thinking, tool use and future block types carry no report text.
    #[serde(other)]
    Other,
}

#[derive(serde::Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_response(json: &str) -> Result<Generation, LlmError> {
    let api: ApiResponse = serde_json::from_str(json).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    let parts: Vec<String> = api
        .content
        .into_iter()
        .filter_map(|block| match block {
            ResponseBlock::Text { text } => Some(text),
            ResponseBlock::Other => None,
        })
        .collect();

    Ok(Generation {
        text: join_text_parts(parts),
        model: api.model,
        stop_reason: api.stop_reason.unwrap_or_else(|| "end_turn".into()),
        input_tokens: api.usage.input_tokens,
        output_tokens: api.usage.output_tokens,
    })
}

#[cfg(test)]
#[path = "anthropic_test.rs"]
mod tests;
