//! Assistant service — page context → one LLM call → report or answer text.
//!
//! DESIGN
//! ======
//! Two operations, both grounded in a serialized `PageContext`:
//! - report: executive summary plus three recommendations as an HTML fragment
//! - answer: reply to one free-text question
//!
//! Each makes at most one outbound call. The tagged form (`report`, `answer`)
//! returns `Result<String, AssistantError>`; the string form
//! (`request_report`, `request_answer`) never fails and substitutes the
//! fixed display text for each failure kind.
//!
//! Chat turns are stateless: earlier turns are never sent back to the model.

use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ErrorCode;
use crate::llm::LlmGenerate;
use crate::llm::types::{GenerateOptions, LlmError};

const DEFAULT_AI_MAX_TOKENS: u32 = 2048;
const DEFAULT_AI_REPORT_TEMPERATURE: f64 = 0.7;

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

// =============================================================================
// TYPES
// =============================================================================

/// Which assistant operation a request or failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Report,
    Chat,
}

impl RequestKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Report => "report",
            Self::Chat => "chat",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("LLM credential not configured")]
    MissingCredential,
    #[error("LLM request failed: {0}")]
    Transport(#[from] LlmError),
    #[error("LLM returned no text")]
    EmptyOutput,
}

impl ErrorCode for AssistantError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingCredential => "E_MISSING_CREDENTIAL",
            Self::Transport(_) => "E_LLM_TRANSPORT",
            Self::EmptyOutput => "E_EMPTY_OUTPUT",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.retryable(),
            Self::EmptyOutput => true,
            Self::MissingCredential => false,
        }
    }
}

impl AssistantError {
    /// Fixed user-facing text shown in place of model output.
    #[must_use]
    pub fn display_text(&self, kind: RequestKind) -> &'static str {
        match (self, kind) {
            (Self::MissingCredential, RequestKind::Report) => "Unable to generate report: API Key missing.",
            (Self::MissingCredential, RequestKind::Chat) => "AI unavailable.",
            (Self::Transport(_), RequestKind::Report) => "An error occurred while analyzing the data. Please try again.",
            (Self::Transport(_), RequestKind::Chat) => "Sorry, I encountered an error.",
            (Self::EmptyOutput, RequestKind::Report) => "No analysis generated.",
            (Self::EmptyOutput, RequestKind::Chat) => "I couldn't process that request.",
        }
    }
}

/// One unit of work for the assistant, as dispatched by a panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantRequest {
    Report { context_data: String, page_title: String },
    Chat { question: String, context_data: String },
}

impl AssistantRequest {
    #[must_use]
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Report { .. } => RequestKind::Report,
            Self::Chat { .. } => RequestKind::Chat,
        }
    }
}

// =============================================================================
// SETTINGS
// =============================================================================

/// Generation knobs for assistant calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssistantSettings {
    pub max_tokens: u32,
    pub report_temperature: Option<f64>,
    pub chat_temperature: Option<f64>,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_AI_MAX_TOKENS,
            report_temperature: Some(DEFAULT_AI_REPORT_TEMPERATURE),
            chat_temperature: None,
        }
    }
}

impl AssistantSettings {
    /// Read `AI_MAX_TOKENS`, `AI_REPORT_TEMPERATURE` and `AI_CHAT_TEMPERATURE`.
    /// Unparseable values fall back to the defaults. Cached after first read.
    #[must_use]
    pub fn from_env() -> Self {
        static VALUE: OnceLock<AssistantSettings> = OnceLock::new();
        *VALUE.get_or_init(Self::read_env)
    }

    fn read_env() -> Self {
        let defaults = Self::default();
        Self {
            max_tokens: env_parse("AI_MAX_TOKENS", defaults.max_tokens),
            report_temperature: Some(env_parse("AI_REPORT_TEMPERATURE", DEFAULT_AI_REPORT_TEMPERATURE)),
            chat_temperature: std::env::var("AI_CHAT_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse::<f64>().ok()),
        }
    }

    fn options(&self, kind: RequestKind) -> GenerateOptions {
        let temperature = match kind {
            RequestKind::Report => self.report_temperature,
            RequestKind::Chat => self.chat_temperature,
        };
        GenerateOptions { temperature, max_tokens: self.max_tokens }
    }
}

// =============================================================================
// ASSISTANT
// =============================================================================

/// AI report/chat client. Holds an already-built LLM client; `None` means no
/// credential was configured and every call short-circuits.
#[derive(Clone)]
pub struct Assistant {
    llm: Option<Arc<dyn LlmGenerate>>,
    settings: AssistantSettings,
}

impl Assistant {
    #[must_use]
    pub fn new(llm: Option<Arc<dyn LlmGenerate>>, settings: AssistantSettings) -> Self {
        Self { llm, settings }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.llm.is_some()
    }

    /// Generate a report for the given page.
    ///
    /// # Errors
    ///
    /// See [`AssistantError`]; no network call is made without a credential.
    pub async fn report(&self, context_data: &str, page_title: &str) -> Result<String, AssistantError> {
        let prompt = build_report_prompt(context_data, page_title);
        self.generate(RequestKind::Report, &prompt).await
    }

    /// Answer one question about the given page. Earlier turns are not sent.
    ///
    /// # Errors
    ///
    /// See [`AssistantError`]; no network call is made without a credential.
    pub async fn answer(&self, question: &str, context_data: &str) -> Result<String, AssistantError> {
        let prompt = build_chat_prompt(question, context_data);
        self.generate(RequestKind::Chat, &prompt).await
    }

    /// Run a dispatched request.
    ///
    /// # Errors
    ///
    /// Same as [`Assistant::report`] / [`Assistant::answer`].
    pub async fn execute(&self, request: &AssistantRequest) -> Result<String, AssistantError> {
        match request {
            AssistantRequest::Report { context_data, page_title } => self.report(context_data, page_title).await,
            AssistantRequest::Chat { question, context_data } => self.answer(question, context_data).await,
        }
    }

    /// Report text, or the fixed failure text. Never fails.
    pub async fn request_report(&self, context_data: &str, page_title: &str) -> String {
        self.report(context_data, page_title)
            .await
            .unwrap_or_else(|e| e.display_text(RequestKind::Report).to_string())
    }

    /// Answer text, or the fixed failure text. Never fails.
    pub async fn request_answer(&self, question: &str, context_data: &str) -> String {
        self.answer(question, context_data)
            .await
            .unwrap_or_else(|e| e.display_text(RequestKind::Chat).to_string())
    }

    async fn generate(&self, kind: RequestKind, prompt: &str) -> Result<String, AssistantError> {
        let Some(llm) = &self.llm else {
            warn!(kind = kind.as_str(), "assistant: LLM not configured");
            return Err(AssistantError::MissingCredential);
        };

        info!(kind = kind.as_str(), prompt_len = prompt.len(), "assistant: request");
        let generation = match llm.generate(prompt, &self.settings.options(kind)).await {
            Ok(generation) => generation,
            Err(e) => {
                warn!(kind = kind.as_str(), error = %e, "assistant: LLM call failed");
                return Err(AssistantError::Transport(e));
            }
        };

        info!(
            kind = kind.as_str(),
            model = %generation.model,
            stop_reason = %generation.stop_reason,
            input_tokens = generation.input_tokens,
            output_tokens = generation.output_tokens,
            "assistant: response"
        );

        if generation.non_empty_text().is_none() {
            warn!(kind = kind.as_str(), "assistant: empty model output");
            return Err(AssistantError::EmptyOutput);
        }
        Ok(generation.text.unwrap_or_default())
    }
}

// =============================================================================
// PROMPTS
// =============================================================================

pub(crate) fn build_report_prompt(context_data: &str, page_title: &str) -> String {
    format!(
        "You are an expert ERP analyst for AquaERP, an aquaculture enterprise platform \
         covering farms, feed production, inventory, finance, HR and logistics.\n\
         Analyze the data currently shown on the \"{page_title}\" page:\n\
         <page_context>{context_data}</page_context>\n\n\
         Write a concise executive summary followed by exactly 3 bullet-point recommendations.\n\
         Format the output as a clean HTML fragment (no <html> or <body> tags) using \
         <h3>, <p>, <ul>, <li> and <strong> only."
    )
}

pub(crate) fn build_chat_prompt(question: &str, context_data: &str) -> String {
    format!(
        "You are the AquaERP assistant, helping staff of an aquaculture enterprise understand their data.\n\
         The user is looking at this page:\n\
         <page_context>{context_data}</page_context>\n\n\
         Answer the question below using that context. Be concise and practical. Reply in plain text.\n\
         <user_input>{question}</user_input>"
    )
}

#[cfg(test)]
#[path = "assistant_test.rs"]
mod tests;
