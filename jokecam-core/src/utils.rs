// jokecam-core/src/utils.rs
//! General utility functions.

use serde::Serialize;
use serde_json::Value;

/// Truncates a string to a maximum character count, adding an ellipsis if truncated.
/// Handles multi-byte characters correctly.
pub fn truncate_string(input: &str, max_chars: usize) -> String {
    if input.chars().count() > max_chars {
        if max_chars < 3 {
            input.chars().take(max_chars).collect::<String>()
        } else {
            format!(
                "{}...",
                input.chars().take(max_chars - 3).collect::<String>()
            )
        }
    } else {
        input.to_string()
    }
}

/// Pretty JSON for logging, with base64 image payloads replaced by their length.
pub fn redact_image_data<T: Serialize>(value: &T) -> String {
    let mut json = match serde_json::to_value(value) {
        Ok(json) => json,
        Err(e) => return format!("Serialization error: {}", e),
    };
    redact_in_place(&mut json);
    serde_json::to_string_pretty(&json).unwrap_or_else(|e| format!("Serialization error: {}", e))
}

fn redact_in_place(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let is_base64_source = map.get("type").and_then(Value::as_str) == Some("base64");
            for (key, child) in map.iter_mut() {
                if is_base64_source && key == "data" {
                    if let Some(len) = child.as_str().map(str::len) {
                        *child = Value::String(format!("<{} base64 chars>", len));
                    }
                } else {
                    redact_in_place(child);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact_in_place),
        _ => {}
    }
}
