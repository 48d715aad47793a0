//! Stateless assistant endpoints.
//!
//! Both always answer 200 with displayable text, mirroring the never-fail
//! string facade. `ok` and `code` let the caller tell a model reply from a
//! fixed failure message.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
use crate::services::assistant::{AssistantError, RequestKind};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportBody {
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub page_title: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub context: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct AssistantReply {
    pub text: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

fn to_reply(kind: RequestKind, result: Result<String, AssistantError>) -> AssistantReply {
    match result {
        Ok(text) => AssistantReply { text, ok: true, code: None },
        Err(e) => AssistantReply { text: e.display_text(kind).to_owned(), ok: false, code: Some(e.error_code()) },
    }
}

/// `POST /api/assistant/report` — one-shot report for a page.
pub async fn report(State(state): State<AppState>, Json(body): Json<ReportBody>) -> Json<AssistantReply> {
    let result = state.assistant.report(&body.context, &body.page_title).await;
    Json(to_reply(RequestKind::Report, result))
}

/// `POST /api/assistant/chat` — one-shot answer to a question.
pub async fn chat(State(state): State<AppState>, Json(body): Json<ChatBody>) -> Json<AssistantReply> {
    let result = state.assistant.answer(&body.question, &body.context).await;
    Json(to_reply(RequestKind::Chat, result))
}

#[cfg(test)]
#[path = "assistant_test.rs"]
mod tests;
