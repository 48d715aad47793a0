//! OpenAI-compatible API client.
//!
//! Supports both `/chat/completions` and `/responses` endpoints. Only plain
//! text flows through here; tool calls and reasoning items in the output are
//! ignored.

use serde::Serialize;
use serde_json::Value;

use super::config::{LlmTimeouts, OpenAiApiMode};
use super::types::{GenerateOptions, Generation, LlmError, join_text_parts};

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    mode: OpenAiApiMode,
}

impl OpenAiClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: String, mode: OpenAiApiMode, base_url: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = super::build_http_client(timeouts)?;
        Ok(Self { http, api_key, base_url, mode })
    }

    /// # Errors
    ///
    /// Returns an error on transport failure, non-200 status or an
    /// unparseable body.
    pub async fn generate(&self, model: &str, prompt: &str, options: &GenerateOptions) -> Result<Generation, LlmError> {
        match self.mode {
            OpenAiApiMode::ChatCompletions => {
                let messages = [CcMessage { role: "user", content: prompt }];
                let body = CcRequest {
                    model,
                    max_tokens: options.max_tokens,
                    temperature: options.temperature,
                    messages: &messages,
                };
                let text = self.send_json("/chat/completions", &body).await?;
                parse_chat_completions_response(&text)
            }
            OpenAiApiMode::Responses => {
                let body = RespRequest {
                    model,
                    max_output_tokens: options.max_tokens,
                    temperature: options.temperature,
                    input: prompt,
                };
                let text = self.send_json("/responses", &body).await?;
                parse_responses_response(&text)
            }
        }
    }

    async fn send_json(&self, path: &str, body: &impl Serialize) -> Result<String, LlmError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
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
        Ok(text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct CcRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    messages: &'a [CcMessage<'a>],
}

#[derive(Serialize)]
struct CcMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct RespRequest<'a> {
    model: &'a str,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    input: &'a str,
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

fn usage_field(root: &Value, key: &str) -> u64 {
    root.get("usage")
        .and_then(|u| u.get(key))
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

fn model_field(root: &Value) -> String {
    root.get("model")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_default()
}

pub(crate) fn parse_chat_completions_response(json_text: &str) -> Result<Generation, LlmError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    let Some(choice) = root
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
    else {
        return Err(LlmError::ApiParse("chat_completions: missing choices[0]".to_string()));
    };
    let finish_reason = choice
        .get("finish_reason")
        .and_then(Value::as_str)
        .unwrap_or("stop");

    let text = choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_owned);

    let stop_reason = if finish_reason == "length" { "max_tokens" } else { "end_turn" };

    Ok(Generation {
        text,
        model: model_field(&root),
        stop_reason: stop_reason.to_string(),
        input_tokens: usage_field(&root, "prompt_tokens"),
        output_tokens: usage_field(&root, "completion_tokens"),
    })
}

pub(crate) fn parse_responses_response(json_text: &str) -> Result<Generation, LlmError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    let mut parts = Vec::new();
    if let Some(items) = root.get("output").and_then(Value::as_array) {
        for item in items {
            if item.get("type").and_then(Value::as_str) != Some("message") {
                continue;
            }
            let Some(content) = item.get("content").and_then(Value::as_array) else {
                continue;
            };
            for part in content {
                let kind = part.get("type").and_then(Value::as_str);
                let text = part.get("text").and_then(Value::as_str).unwrap_or("");
                if matches!(kind, Some("output_text" | "text")) && !text.is_empty() {
                    parts.push(text.to_string());
                }
            }
        }
    } else if let Some(output_text) = root.get("output_text").and_then(Value::as_str) {
        if !output_text.is_empty() {
            parts.push(output_text.to_string());
        }
    }

    let truncated = root
        .get("incomplete_details")
        .and_then(|d| d.get("reason"))
        .and_then(Value::as_str)
        == Some("max_output_tokens");
    let stop_reason = if truncated { "max_tokens" } else { "end_turn" };

    Ok(Generation {
        text: join_text_parts(parts),
        model: model_field(&root),
        stop_reason: stop_reason.to_string(),
        input_tokens: usage_field(&root, "input_tokens"),
        output_tokens: usage_field(&root, "output_tokens"),
    })
}

#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;
