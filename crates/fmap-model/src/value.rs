//! Display formatting for leaf values and keys.

use serde_json::Value;

/// Text shown for missing or null values.
pub const MISSING_VALUE: &str = "N/A";

/// Formats a leaf value for tables and documents.
///
/// Arrays are joined with `", "`; nested objects and arrays inside them are
/// rendered as compact JSON. A top-level object is pretty-printed, or `{}`
/// when empty.
pub fn format_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => MISSING_VALUE.to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.clone(),
                Value::Null => "null".to_string(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(Value::Object(map)) if map.is_empty() => "{}".to_string(),
        Some(object @ Value::Object(_)) => {
            serde_json::to_string_pretty(object).unwrap_or_else(|_| object.to_string())
        }
        Some(other) => other.to_string(),
    }
}

/// The part of a dotted key after the last `.`.
pub fn last_segment(key: &str) -> &str {
    key.rsplit('.').next().unwrap_or(key)
}
