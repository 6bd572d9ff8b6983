//! Error message extraction for non-2xx backend responses

use reqwest::StatusCode;
use serde_json::Value;

const MESSAGE_FIELDS: [&str; 3] = ["detail", "message", "error"];

/// Human-readable message for a failed response
///
/// Prefers a `detail`, `message` or `error` field of a JSON body, then the
/// raw body, then the status reason.
pub fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) {
        let field = MESSAGE_FIELDS.iter().find_map(|name| fields.get(*name));
        match field {
            Some(Value::String(message)) if !message.trim().is_empty() => {
                return message.trim().to_owned();
            }
            Some(Value::Null | Value::String(_)) | None => {}
            Some(other) => return other.to_string(),
        }
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_owned();
    }

    status
        .canonical_reason()
        .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_owned)
}
