use super::*;

fn make_response(content: serde_json::Value) -> String {
    serde_json::json!({
        "id": "msg_123",
        "type": "message",
        "role": "assistant",
        "content": content,
        "model": "claude-sonnet-4-5-20250929",
        "stop_reason": "end_turn",
        "usage": { "input_tokens": 100, "output_tokens": 50 }
    })
    .to_string()
}

#[test]
fn parse_text_response() {
    let json = make_response(serde_json::json!([
        { "type": "text", "text": "<p>Hello</p>" }
    ]));
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.text.as_deref(), Some("<p>Hello</p>"));
    assert_eq!(resp.model, "claude-sonnet-4-5-20250929");
    assert_eq!(resp.stop_reason, "end_turn");
    assert_eq!(resp.input_tokens, 100);
    assert_eq!(resp.output_tokens, 50);
}

#[test]
fn parse_joins_multiple_text_blocks() {
    let json = make_response(serde_json::json!([
        { "type": "text", "text": "<h3>Summary</h3>" },
        { "type": "text", "text": "<ul><li>Cut feed waste</li></ul>" }
    ]));
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.text.as_deref(), Some("<h3>Summary</h3><ul><li>Cut feed waste</li></ul>"));
}

#[test]
fn parse_thinking_blocks_are_skipped() {
    let json = make_response(serde_json::json!([
        { "type": "thinking", "thinking": "Let me think..." },
        { "type": "text", "text": "Here is my answer" }
    ]));
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.text.as_deref(), Some("Here is my answer"));
}

#[test]
fn parse_thinking_only_response_has_no_text() {
    let json = make_response(serde_json::json!([
        { "type": "thinking", "thinking": "Let me think..." }
    ]));
    let resp = parse_response(&json).unwrap();
    assert!(resp.text.is_none());
}

#[test]
fn parse_missing_stop_reason_defaults() {
    let json = serde_json::json!({
        "content": [],
        "model": "claude",
        "stop_reason": null,
        "usage": { "input_tokens": 1, "output_tokens": 0 }
    })
    .to_string();
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.stop_reason, "end_turn");
    assert!(resp.text.is_none());
}

#[test]
fn parse_invalid_json() {
    let err = parse_response("not json").unwrap_err();
    assert!(matches!(err, LlmError::ApiParse(_)));
}

#[test]
fn request_omits_unset_temperature() {
    let messages = [ApiMessage { role: "user", content: "hi" }];
    let body = ApiRequest { model: "m", max_tokens: 10, temperature: None, messages: &messages };
    let value = serde_json::to_value(&body).unwrap();
    assert!(value.get("temperature").is_none());
    assert_eq!(value["messages"][0]["role"], "user");
    assert_eq!(value["messages"][0]["content"], "hi");
}
