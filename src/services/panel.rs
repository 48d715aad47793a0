//! Panel service — runs panel dispatches against the assistant.
//!
//! DESIGN
//! ======
//! Panels are keyed by a server-assigned UUID in `AppState::panels`. Every
//! dispatch is executed on its own spawned task whose `AbortHandle` is kept
//! next to the panel. Closing a panel (or invalidating a request on a view
//! change) aborts that task. If a result still lands afterwards, it finds
//! either no panel or a mismatched ticket and is dropped.

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::context::{PageContext, ViewInput};
use crate::error::ErrorCode;
use crate::panel::{ChatMessage, Dispatch, Panel, PanelMode, PanelPhase, Resolution, Ticket};
use crate::state::{AppState, PanelEntry};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PanelServiceError {
    #[error("panel not found: {0}")]
    NotFound(Uuid),
    #[error(transparent)]
    Panel(#[from] crate::panel::PanelError),
}

impl ErrorCode for PanelServiceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_PANEL_NOT_FOUND",
            Self::Panel(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Panel(e) if e.retryable())
    }
}

/// Serializable view of a panel for the dashboard.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PanelSnapshot {
    pub id: Uuid,
    pub mode: PanelMode,
    pub phase: PanelPhase,
    pub page_title: &'static str,
    pub context: PageContext,
    pub report: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub last_error: Option<&'static str>,
}

impl PanelSnapshot {
    pub(crate) fn of(id: Uuid, panel: &Panel) -> Self {
        Self {
            id,
            mode: panel.mode(),
            phase: panel.phase(),
            page_title: panel.context().page_title(),
            context: panel.context().clone(),
            report: panel.report().map(str::to_owned),
            messages: panel.messages().to_vec(),
            last_error: panel.last_error(),
        }
    }
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Open a panel for the given view and start its report.
pub async fn open_panel(state: &AppState, input: &ViewInput) -> PanelSnapshot {
    let id = Uuid::new_v4();
    let (panel, dispatch) = Panel::open(PageContext::capture(input));
    info!(panel_id = %id, view = %panel.context().active_view, "panel: open");

    let mut panels = state.panels.write().await;
    let entry = panels.entry(id).or_insert_with(|| PanelEntry::new(panel));
    spawn_dispatch(state, id, entry, dispatch);
    PanelSnapshot::of(id, &entry.panel)
}

/// Current snapshot of a panel.
///
/// # Errors
///
/// [`PanelServiceError::NotFound`] if the panel is closed or never existed.
pub async fn snapshot(state: &AppState, id: Uuid) -> Result<PanelSnapshot, PanelServiceError> {
    let panels = state.panels.read().await;
    let entry = panels.get(&id).ok_or(PanelServiceError::NotFound(id))?;
    Ok(PanelSnapshot::of(id, &entry.panel))
}

/// Switch between report and chat mode. Returning to report mode without a
/// report starts one.
///
/// # Errors
///
/// [`PanelServiceError::NotFound`] if the panel is closed.
pub async fn set_mode(state: &AppState, id: Uuid, mode: PanelMode) -> Result<PanelSnapshot, PanelServiceError> {
    let mut panels = state.panels.write().await;
    let entry = panels.get_mut(&id).ok_or(PanelServiceError::NotFound(id))?;
    debug!(panel_id = %id, ?mode, "panel: mode");
    if let Some(dispatch) = entry.panel.set_mode(mode) {
        spawn_dispatch(state, id, entry, dispatch);
    }
    Ok(PanelSnapshot::of(id, &entry.panel))
}

/// Regenerate the report.
///
/// # Errors
///
/// Not found, or busy while another request is in flight.
pub async fn regenerate(state: &AppState, id: Uuid) -> Result<PanelSnapshot, PanelServiceError> {
    let mut panels = state.panels.write().await;
    let entry = panels.get_mut(&id).ok_or(PanelServiceError::NotFound(id))?;
    let dispatch = entry.panel.regenerate()?;
    spawn_dispatch(state, id, entry, dispatch);
    Ok(PanelSnapshot::of(id, &entry.panel))
}

/// Send a chat question. Whitespace-only questions change nothing.
///
/// # Errors
///
/// Not found, or busy while another request is in flight.
pub async fn send_message(state: &AppState, id: Uuid, question: &str) -> Result<PanelSnapshot, PanelServiceError> {
    let mut panels = state.panels.write().await;
    let entry = panels.get_mut(&id).ok_or(PanelServiceError::NotFound(id))?;
    if let Some(dispatch) = entry.panel.send_message(question)? {
        spawn_dispatch(state, id, entry, dispatch);
    }
    Ok(PanelSnapshot::of(id, &entry.panel))
}

/// Re-snapshot the page context after the host navigated.
///
/// # Errors
///
/// [`PanelServiceError::NotFound`] if the panel is closed.
pub async fn change_view(state: &AppState, id: Uuid, input: &ViewInput) -> Result<PanelSnapshot, PanelServiceError> {
    let mut panels = state.panels.write().await;
    let entry = panels.get_mut(&id).ok_or(PanelServiceError::NotFound(id))?;
    let change = entry.panel.change_view(input);
    if let Some(ticket) = change.invalidated {
        debug!(panel_id = %id, ?ticket, "panel: report invalidated by view change");
        entry.abort_task();
    }
    if let Some(dispatch) = change.dispatch {
        spawn_dispatch(state, id, entry, dispatch);
    }
    info!(panel_id = %id, view = %entry.panel.context().active_view, "panel: view changed");
    Ok(PanelSnapshot::of(id, &entry.panel))
}

/// Close a panel, aborting any in-flight request and discarding all state.
///
/// # Errors
///
/// [`PanelServiceError::NotFound`] if the panel is already closed.
pub async fn close_panel(state: &AppState, id: Uuid) -> Result<(), PanelServiceError> {
    let mut panels = state.panels.write().await;
    let mut entry = panels.remove(&id).ok_or(PanelServiceError::NotFound(id))?;
    entry.abort_task();
    info!(panel_id = %id, "panel: closed");
    Ok(())
}

/// Apply a finished request to its panel and start any report it now owes.
/// Missing panels and stale tickets are silently ignored.
pub(crate) async fn apply_result(
    state: &AppState,
    id: Uuid,
    ticket: Ticket,
    outcome: Result<String, crate::services::assistant::AssistantError>,
) -> bool {
    let mut panels = state.panels.write().await;
    let Some(entry) = panels.get_mut(&id) else {
        debug!(panel_id = %id, "panel: result for closed panel dropped");
        return false;
    };
    let Resolution::Applied { follow_up } = entry.panel.resolve(ticket, outcome) else {
        debug!(panel_id = %id, ?ticket, "panel: stale result dropped");
        return false;
    };
    entry.task = None;
    debug!(panel_id = %id, phase = ?entry.panel.phase(), "panel: result applied");
    if let Some(dispatch) = follow_up {
        spawn_dispatch(state, id, entry, dispatch);
    }
    true
}

// =============================================================================
// TASKS
// =============================================================================

/// Run one dispatch on a spawned task. Caller holds the panels write lock,
/// so the task cannot apply its result before the handle is stored.
fn spawn_dispatch(state: &AppState, id: Uuid, entry: &mut PanelEntry, dispatch: Dispatch) {
    let task_state = state.clone();
    let Dispatch { ticket, request } = dispatch;
    debug!(panel_id = %id, kind = request.kind().as_str(), "panel: dispatch");

    let handle = tokio::spawn(async move {
        let outcome = task_state.assistant.execute(&request).await;
        apply_result(&task_state, id, ticket, outcome).await;
    });
    entry.task = Some(handle.abort_handle());
}

#[cfg(test)]
#[path = "panel_test.rs"]
mod tests;
