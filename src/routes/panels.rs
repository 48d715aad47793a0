//! Panel routes. Thin wrappers over `services::panel`.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use super::{ApiError, api_error};
use crate::context::ViewInput;
use crate::panel::{PanelError, PanelMode};
use crate::services::panel::{self, PanelServiceError, PanelSnapshot};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ModeBody {
    pub mode: PanelMode,
}

#[derive(Debug, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub question: String,
}

/// `POST /api/panels` — open a panel and start its report.
pub async fn open(State(state): State<AppState>, Json(body): Json<ViewInput>) -> (StatusCode, Json<PanelSnapshot>) {
    let snap = panel::open_panel(&state, &body).await;
    (StatusCode::CREATED, Json(snap))
}

/// `GET /api/panels/:id`
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<PanelSnapshot>, ApiError> {
    panel::snapshot(&state, id).await.map(Json).map_err(panel_error)
}

/// `PUT /api/panels/:id/view` — the host navigated to another view.
pub async fn change_view(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ViewInput>,
) -> Result<Json<PanelSnapshot>, ApiError> {
    panel::change_view(&state, id, &body)
        .await
        .map(Json)
        .map_err(panel_error)
}

/// `POST /api/panels/:id/mode`
pub async fn set_mode(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ModeBody>,
) -> Result<Json<PanelSnapshot>, ApiError> {
    panel::set_mode(&state, id, body.mode)
        .await
        .map(Json)
        .map_err(panel_error)
}

/// `POST /api/panels/:id/regenerate`
pub async fn regenerate(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<PanelSnapshot>, ApiError> {
    panel::regenerate(&state, id).await.map(Json).map_err(panel_error)
}

/// `POST /api/panels/:id/messages`
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<MessageBody>,
) -> Result<Json<PanelSnapshot>, ApiError> {
    panel::send_message(&state, id, &body.question)
        .await
        .map(Json)
        .map_err(panel_error)
}

/// `DELETE /api/panels/:id`
pub async fn close(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    panel::close_panel(&state, id).await.map_err(panel_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn panel_error(err: PanelServiceError) -> ApiError {
    let status = match &err {
        PanelServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        PanelServiceError::Panel(PanelError::Busy) => StatusCode::CONFLICT,
    };
    api_error(status, &err)
}

#[cfg(test)]
#[path = "panels_test.rs"]
mod tests;
