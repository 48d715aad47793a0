use super::*;

fn make_response(parts: serde_json::Value, finish_reason: &str) -> String {
    serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": parts },
            "finishReason": finish_reason,
            "index": 0
        }],
        "usageMetadata": { "promptTokenCount": 120, "candidatesTokenCount": 40, "totalTokenCount": 160 },
        "modelVersion": "gemini-2.5-flash"
    })
    .to_string()
}

#[test]
fn parse_text_response() {
    let json = make_response(serde_json::json!([{ "text": "<p>Hello</p>" }]), "STOP");
    let resp = parse_response(&json, "gemini-2.5-flash").unwrap();
    assert_eq!(resp.text.as_deref(), Some("<p>Hello</p>"));
    assert_eq!(resp.stop_reason, "end_turn");
    assert_eq!(resp.input_tokens, 120);
    assert_eq!(resp.output_tokens, 40);
    assert_eq!(resp.model, "gemini-2.5-flash");
}

#[test]
fn parse_skips_thought_parts() {
    let json = make_response(
        serde_json::json!([
            { "text": "planning the summary", "thought": true },
            { "text": "<h3>Summary</h3>" }
        ]),
        "STOP",
    );
    let resp = parse_response(&json, "m").unwrap();
    assert_eq!(resp.text.as_deref(), Some("<h3>Summary</h3>"));
}

#[test]
fn parse_safety_block_has_no_text() {
    let json = serde_json::json!({
        "candidates": [{ "finishReason": "SAFETY" }],
        "usageMetadata": { "promptTokenCount": 10 }
    })
    .to_string();
    let resp = parse_response(&json, "gemini-2.5-flash").unwrap();
    assert!(resp.text.is_none());
    assert_eq!(resp.stop_reason, "refusal");
    assert_eq!(resp.model, "gemini-2.5-flash");
}

#[test]
fn parse_no_candidates_has_no_text() {
    let json = serde_json::json!({ "promptFeedback": { "blockReason": "OTHER" } }).to_string();
    let resp = parse_response(&json, "gemini-2.5-flash").unwrap();
    assert!(resp.text.is_none());
    assert_eq!(resp.input_tokens, 0);
}

#[test]
fn parse_max_tokens_finish_reason() {
    let json = make_response(serde_json::json!([{ "text": "partial" }]), "MAX_TOKENS");
    let resp = parse_response(&json, "m").unwrap();
    assert_eq!(resp.stop_reason, "max_tokens");
}

#[test]
fn parse_invalid_json() {
    assert!(matches!(parse_response("not json", "m"), Err(LlmError::ApiParse(_))));
}

#[test]
fn request_uses_camel_case_generation_config() {
    let parts = [RequestPart { text: "prompt" }];
    let contents = [RequestContent { role: "user", parts: &parts }];
    let body = ApiRequest {
        contents: &contents,
        generation_config: GenerationConfig { temperature: Some(0.7), max_output_tokens: 512 },
    };
    let value = serde_json::to_value(&body).unwrap();
    assert_eq!(value["generationConfig"]["maxOutputTokens"], 512);
    assert_eq!(value["generationConfig"]["temperature"], 0.7);
    assert_eq!(value["contents"][0]["parts"][0]["text"], "prompt");
}
