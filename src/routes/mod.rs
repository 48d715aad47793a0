//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The dashboard shell talks to this service over JSON. Two stateless
//! endpoints expose the assistant directly; the `/api/panels` family hosts
//! server-side panels whose requests run in the background and are polled.

pub mod assistant;
pub mod panels;

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{ErrorBody, ErrorCode};
use crate::state::AppState;

/// Error response shared by every handler.
pub type ApiError = (StatusCode, Json<ErrorBody>);

pub(crate) fn api_error(status: StatusCode, err: &(impl ErrorCode + ?Sized)) -> ApiError {
    (status, Json(ErrorBody::from_error(err)))
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/assistant/report", post(assistant::report))
        .route("/api/assistant/chat", post(assistant::chat))
        .route("/api/panels", post(panels::open))
        .route("/api/panels/{id}", get(panels::get).delete(panels::close))
        .route("/api/panels/{id}/view", put(panels::change_view))
        .route("/api/panels/{id}/mode", post(panels::set_mode))
        .route("/api/panels/{id}/regenerate", post(panels::regenerate))
        .route("/api/panels/{id}/messages", post(panels::send_message))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn healthz_is_ok() {
        assert_eq!(healthz().await, StatusCode::OK);
    }

    #[test]
    fn api_error_carries_code() {
        let (status, Json(body)) = api_error(StatusCode::CONFLICT, &crate::panel::PanelError::Busy);
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.code, "E_PANEL_BUSY");
        assert!(body.retryable);
    }
}
