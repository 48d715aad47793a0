//! Page context — the snapshot of "what the user is looking at".
//!
//! DESIGN
//! ======
//! The navigation shell identifies each dashboard page with a free-form view
//! tag ("finance", "inventory-feed", "iot-devices", ...). A `PageContext` is
//! built fresh every time the assistant needs grounding and serialized to
//! JSON for the prompt. Building one cannot fail; absent fields are empty.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// =============================================================================
// PAGE TITLES
// =============================================================================

/// Title used when no known keyword appears in the view tag.
pub const DEFAULT_PAGE_TITLE: &str = "AquaERP Overview";

/// Keyword → title table, checked in order; first hit wins. `hr` is matched
/// as a whole segment of the tag rather than a substring.
const PAGE_TITLES: &[(&[&str], &str)] = &[
    (&["finance"], "Financial Analytics"),
    (&["inventory"], "Inventory Management"),
    (&["hr"], "Human Resources"),
    (&["farmer", "crm"], "Farmer CRM"),
    (&["feed"], "Feed Plant Operations"),
    (&["fleet"], "Fleet Tracking"),
    (&["support", "ticket"], "Support Tickets"),
    (&["iot", "device"], "IoT Device Management"),
    (&["setting"], "System Settings"),
    (&["dashboard"], "Executive Dashboard"),
];

/// Derive a human-readable page title from a view tag.
///
/// Matching is a case-insensitive substring test, except `hr`, which must be
/// a whole segment of the tag (`hr`, `hr-payroll`) so that words like
/// "threshold" are not read as Human Resources.
#[must_use]
pub fn page_title(active_view: &str) -> &'static str {
    let tag = active_view.to_ascii_lowercase();
    let matches = |keyword: &str| {
        if keyword == "hr" {
            tag.split(|c: char| !c.is_ascii_alphanumeric()).any(|seg| seg == "hr")
        } else {
            tag.contains(keyword)
        }
    };

    PAGE_TITLES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| matches(k)))
        .map_or(DEFAULT_PAGE_TITLE, |&(_, title)| title)
}

// =============================================================================
// PAGE CONTEXT
// =============================================================================

/// Serializable description of the current screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    #[serde(default)]
    pub active_view: String,
    /// RFC 3339 / ISO-8601 wall-clock time of the snapshot.
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub note: String,
}

/// Host-supplied inputs for a snapshot. Everything is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewInput {
    #[serde(default)]
    pub active_view: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl PageContext {
    /// Snapshot the given view at the current wall-clock time.
    #[must_use]
    pub fn capture(input: &ViewInput) -> Self {
        Self::capture_at(input, OffsetDateTime::now_utc())
    }

    /// Snapshot the given view at a fixed time.
    #[must_use]
    pub fn capture_at(input: &ViewInput, at: OffsetDateTime) -> Self {
        Self {
            active_view: input.active_view.clone().unwrap_or_default(),
            timestamp: at.format(&Rfc3339).unwrap_or_default(),
            user: input.user.clone().unwrap_or_default(),
            note: input.note.clone().unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn page_title(&self) -> &'static str {
        page_title(&self.active_view)
    }

    /// JSON form embedded in prompts.
    #[must_use]
    pub fn to_json(&self) -> String {
        // Four string fields cannot fail to serialize.
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
