use super::*;

fn view(tag: &str) -> ViewInput {
    ViewInput { active_view: Some(tag.into()), user: None, note: None }
}

// =============================================================================
// page_title
// =============================================================================

#[test]
fn title_for_known_views() {
    let cases = [
        ("dashboard", "Executive Dashboard"),
        ("inventory", "Inventory Management"),
        ("finance", "Financial Analytics"),
        ("hr", "Human Resources"),
        ("farmers", "Farmer CRM"),
        ("crm", "Farmer CRM"),
        ("feed-plant", "Feed Plant Operations"),
        ("fleet", "Fleet Tracking"),
        ("support", "Support Tickets"),
        ("iot", "IoT Device Management"),
        ("settings", "System Settings"),
    ];
    for (tag, title) in cases {
        assert_eq!(page_title(tag), title, "tag {tag}");
    }
}

#[test]
fn title_matches_by_substring() {
    assert_eq!(page_title("finance-ledger"), "Financial Analytics");
    assert_eq!(page_title("corporate_finance"), "Financial Analytics");
    assert_eq!(page_title("support-tickets-open"), "Support Tickets");
}

#[test]
fn title_is_case_insensitive() {
    assert_eq!(page_title("FINANCE"), "Financial Analytics");
    assert_eq!(page_title("IoT-Devices"), "IoT Device Management");
}

#[test]
fn title_hr_requires_whole_segment() {
    assert_eq!(page_title("hr-payroll"), "Human Resources");
    assert_eq!(page_title("threshold-alerts"), DEFAULT_PAGE_TITLE);
}

#[test]
fn title_finance_wins_over_hr() {
    assert_eq!(page_title("finance-hr-costs"), "Financial Analytics");
}

#[test]
fn title_inventory_wins_over_hr() {
    assert_eq!(page_title("inventory-hr-staffing"), "Inventory Management");
    assert_eq!(page_title("hr-feed-crew"), "Human Resources");
}

#[test]
fn title_unknown_and_empty_fall_back() {
    assert_eq!(page_title("login"), DEFAULT_PAGE_TITLE);
    assert_eq!(page_title(""), DEFAULT_PAGE_TITLE);
}

// =============================================================================
// PageContext
// =============================================================================

#[test]
fn capture_defaults_absent_fields_to_empty() {
    let ctx = PageContext::capture(&ViewInput::default());
    assert_eq!(ctx.active_view, "");
    assert_eq!(ctx.user, "");
    assert_eq!(ctx.note, "");
    assert!(!ctx.timestamp.is_empty());
}

#[test]
fn capture_at_formats_rfc3339() {
    let at = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
    let ctx = PageContext::capture_at(&view("finance"), at);
    assert_eq!(ctx.timestamp, "2023-11-14T22:13:20Z");
    assert_eq!(ctx.page_title(), "Financial Analytics");
}

#[test]
fn to_json_uses_camel_case_keys() {
    let input = ViewInput {
        active_view: Some("finance".into()),
        user: Some("Admin User".into()),
        note: Some("Q3 close".into()),
    };
    let ctx = PageContext::capture_at(&input, OffsetDateTime::UNIX_EPOCH);
    let value: serde_json::Value = serde_json::from_str(&ctx.to_json()).unwrap();
    assert_eq!(value["activeView"], "finance");
    assert_eq!(value["user"], "Admin User");
    assert_eq!(value["note"], "Q3 close");
    assert_eq!(value["timestamp"], "1970-01-01T00:00:00Z");
}

#[test]
fn view_input_accepts_partial_json() {
    let input: ViewInput = serde_json::from_str(r#"{"activeView":"fleet"}"#).unwrap();
    assert_eq!(input.active_view.as_deref(), Some("fleet"));
    assert!(input.user.is_none());
}
