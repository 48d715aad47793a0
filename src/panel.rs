//! Assistant panel state machine.
//!
//! ARCHITECTURE
//! ============
//! A `Panel` is pure state: it decides what to dispatch and how to apply a
//! result, but never performs I/O. The host (`services::panel`) runs the
//! returned [`Dispatch`] and feeds the outcome back through
//! [`Panel::resolve`].
//!
//! DESIGN
//! ======
//! - At most one request is in flight. Dispatching while busy is rejected.
//! - Every dispatch carries a [`Ticket`]; a resolution whose ticket is not the
//!   current in-flight ticket is dropped. This is what makes late results
//!   after a view change harmless.
//! - Mode is orthogonal to loading: switching modes never cancels a request.
//! - The phase shown to the UI is derived, not stored.

use serde::{Deserialize, Serialize};

use crate::context::{PageContext, ViewInput};
use crate::error::ErrorCode;
use crate::services::assistant::{AssistantError, AssistantRequest, RequestKind};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelMode {
    Report,
    Chat,
}

/// UI-facing phase, derived from mode, in-flight request and stored results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelPhase {
    Idle,
    ReportLoading,
    ReportReady,
    ChatIdle,
    ChatSending,
    ChatReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One entry in the visible chat log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Identifies one dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// A request the host must run, paired with the ticket to resolve it with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub ticket: Ticket,
    pub request: AssistantRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlight {
    ticket: Ticket,
    kind: RequestKind,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PanelError {
    #[error("a request is already in flight for this panel")]
    Busy,
}

impl ErrorCode for PanelError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Busy => "E_PANEL_BUSY",
        }
    }

    fn retryable(&self) -> bool {
        true
    }
}

// =============================================================================
// PANEL
// =============================================================================

#[derive(Debug, Clone)]
pub struct Panel {
    mode: PanelMode,
    context: PageContext,
    report: Option<String>,
    messages: Vec<ChatMessage>,
    in_flight: Option<InFlight>,
    last_error: Option<&'static str>,
    next_ticket: u64,
}

impl Panel {
    /// Open a panel in report mode. The report is dispatched immediately
    /// since nothing is cached yet.
    #[must_use]
    pub fn open(context: PageContext) -> (Self, Dispatch) {
        let mut panel = Self {
            mode: PanelMode::Report,
            context,
            report: None,
            messages: Vec::new(),
            in_flight: None,
            last_error: None,
            next_ticket: 0,
        };
        let dispatch = panel.dispatch_report();
        (panel, dispatch)
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn mode(&self) -> PanelMode {
        self.mode
    }

    #[must_use]
    pub fn context(&self) -> &PageContext {
        &self.context
    }

    #[must_use]
    pub fn report(&self) -> Option<&str> {
        self.report.as_deref()
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Error code of the most recent failed request, cleared by the next success.
    #[must_use]
    pub fn last_error(&self) -> Option<&'static str> {
        self.last_error
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    #[must_use]
    pub fn in_flight_ticket(&self) -> Option<Ticket> {
        self.in_flight.map(|f| f.ticket)
    }

    #[must_use]
    pub fn phase(&self) -> PanelPhase {
        let pending = self.in_flight.map(|f| f.kind);
        match self.mode {
            PanelMode::Report => match (pending, &self.report) {
                (Some(RequestKind::Report), _) => PanelPhase::ReportLoading,
                (_, Some(_)) => PanelPhase::ReportReady,
                (_, None) => PanelPhase::Idle,
            },
            PanelMode::Chat => match pending {
                Some(RequestKind::Chat) => PanelPhase::ChatSending,
                _ if self.messages.is_empty() => PanelPhase::ChatIdle,
                _ => PanelPhase::ChatReady,
            },
        }
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Switch modes. Never cancels an in-flight request. Entering report mode
    /// with no report and nothing in flight dispatches one.
    pub fn set_mode(&mut self, mode: PanelMode) -> Option<Dispatch> {
        self.mode = mode;
        self.report_owed()
    }

    /// Regenerate the report, overwriting any previous one on resolution.
    ///
    /// # Errors
    ///
    /// [`PanelError::Busy`] if a request is already in flight.
    pub fn regenerate(&mut self) -> Result<Dispatch, PanelError> {
        if self.is_busy() {
            return Err(PanelError::Busy);
        }
        Ok(self.dispatch_report())
    }

    /// Send a chat question. Whitespace-only input dispatches nothing and
    /// leaves the log untouched (`Ok(None)`). Otherwise the trimmed question
    /// is appended to the log immediately.
    ///
    /// # Errors
    ///
    /// [`PanelError::Busy`] if a request is already in flight.
    pub fn send_message(&mut self, question: &str) -> Result<Option<Dispatch>, PanelError> {
        let question = question.trim();
        if question.is_empty() {
            return Ok(None);
        }
        if self.is_busy() {
            return Err(PanelError::Busy);
        }

        self.messages
            .push(ChatMessage { role: ChatRole::User, content: question.to_string() });
        let request = AssistantRequest::Chat { question: question.to_string(), context_data: self.context.to_json() };
        Ok(Some(self.start(request)))
    }

    /// Replace the page context after the host navigated to another view.
    ///
    /// The cached report is cleared. An in-flight report for the old context
    /// is invalidated and returned so the host can abort it; an in-flight chat
    /// turn keeps running. In report mode a fresh report is dispatched when
    /// the panel is free, otherwise once the chat turn resolves.
    pub fn change_view(&mut self, input: &ViewInput) -> ViewChange {
        self.context = PageContext::capture(input);
        self.report = None;

        let invalidated = match self.in_flight {
            Some(f) if f.kind == RequestKind::Report => {
                self.in_flight = None;
                Some(f.ticket)
            }
            _ => None,
        };

        ViewChange { invalidated, dispatch: self.report_owed() }
    }

    /// Apply the outcome of a dispatched request. A stale ticket changes
    /// nothing.
    pub fn resolve(&mut self, ticket: Ticket, outcome: Result<String, AssistantError>) -> Resolution {
        let Some(in_flight) = self.in_flight else {
            return Resolution::Stale;
        };
        if in_flight.ticket != ticket {
            return Resolution::Stale;
        }
        self.in_flight = None;

        let text = match outcome {
            Ok(text) => {
                self.last_error = None;
                text
            }
            Err(e) => {
                self.last_error = Some(e.error_code());
                e.display_text(in_flight.kind).to_string()
            }
        };

        match in_flight.kind {
            RequestKind::Report => self.report = Some(text),
            RequestKind::Chat => self
                .messages
                .push(ChatMessage { role: ChatRole::Assistant, content: text }),
        }
        Resolution::Applied { follow_up: self.report_owed() }
    }

    /// Report mode with no report and nothing in flight owes a report.
    fn report_owed(&mut self) -> Option<Dispatch> {
        if self.mode == PanelMode::Report && self.report.is_none() && !self.is_busy() {
            Some(self.dispatch_report())
        } else {
            None
        }
    }

    fn dispatch_report(&mut self) -> Dispatch {
        let request = AssistantRequest::Report {
            context_data: self.context.to_json(),
            page_title: self.context.page_title().to_string(),
        };
        self.start(request)
    }

    fn start(&mut self, request: AssistantRequest) -> Dispatch {
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        self.in_flight = Some(InFlight { ticket, kind: request.kind() });
        Dispatch { ticket, request }
    }
}

/// Outcome of [`Panel::change_view`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewChange {
    /// In-flight report that no longer applies; its result will be ignored.
    pub invalidated: Option<Ticket>,
    /// Fresh report to run for the new context.
    pub dispatch: Option<Dispatch>,
}

/// Outcome of [`Panel::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The ticket was not the in-flight one; nothing changed.
    Stale,
    /// The result was applied. `follow_up` is a report the panel now owes,
    /// e.g. after a view change landed while a chat turn was running.
    Applied { follow_up: Option<Dispatch> },
}

impl Resolution {
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

#[cfg(test)]
#[path = "panel_test.rs"]
mod tests;
