//! HTTP error body inspection

use serde_json::Value;

/// Longest raw body kept in an error message
const MAX_BODY_PREVIEW_CHARS: usize = 512;

/// Pull a human-readable message out of an error response body.
///
/// Falls back to a truncated copy of the raw body when it is not one of the
/// known JSON error shapes.
pub fn error_message_from_body(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    serde_json::from_str::<Value>(trimmed)
        .ok()
        .and_then(|json| extract_error_message(&json))
        .or_else(|| Some(preview(trimmed)))
}

/// Extract the message from known JSON error formats
fn extract_error_message(json: &Value) -> Option<String> {
    // OpenAI and Anthropic: { "error": { "message": "...", "type": "..." } }
    if let Some(error) = json.get("error") {
        if let Some(message) = error.get("message").and_then(|v| v.as_str()) {
            return Some(message.to_string());
        }

        // { "error": "..." }
        if let Some(message) = error.as_str() {
            return Some(message.to_string());
        }
    }

    // Generic format: { "message": "..." }
    json.get("message")
        .and_then(|v| v.as_str())
        .map(|message| message.to_string())
}

fn preview(body: &str) -> String {
    if body.chars().count() <= MAX_BODY_PREVIEW_CHARS {
        body.to_string()
    } else {
        let cut: String = body.chars().take(MAX_BODY_PREVIEW_CHARS).collect();
        format!("{}…", cut)
    }
}
