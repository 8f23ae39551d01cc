//! JSON input and primary record selection.

use serde_json::{Map, Value};

use crate::error::{IngestError, Result};

/// Parses JSON text and selects the record at `index`.
pub fn parse_json_record(text: &str, index: usize) -> Result<Map<String, Value>> {
    if text.trim().is_empty() {
        return Err(IngestError::EmptyInput);
    }
    let root: Value = serde_json::from_str(text)?;
    select_record(&root, index).cloned()
}

/// Finds the record to process inside a parsed JSON document.
///
/// Lookup order:
/// 1. a non-empty `data` array on a root object (API list envelopes)
/// 2. the root object itself, when it has no truthy `data` member
/// 3. a non-empty root array
///
/// The selected element must be an object.
pub fn select_record(root: &Value, index: usize) -> Result<&Map<String, Value>> {
    let candidate = match root {
        Value::Object(map) => match map.get("data") {
            Some(Value::Array(items)) if !items.is_empty() => pick(items, index)?,
            Some(data) if is_truthy(data) => {
                return Err(IngestError::NoRecord {
                    reason: "'data' is present but is not a non-empty array".to_string(),
                });
            }
            _ => {
                if index != 0 {
                    return Err(IngestError::RecordIndexOutOfRange {
                        index,
                        available: 1,
                    });
                }
                root
            }
        },
        Value::Array(items) if !items.is_empty() => pick(items, index)?,
        _ => {
            return Err(IngestError::NoRecord {
                reason: "expected a root object, a root array or a 'data' array".to_string(),
            });
        }
    };
    candidate.as_object().ok_or_else(|| IngestError::NoRecord {
        reason: "the selected record is not an object".to_string(),
    })
}

fn pick(items: &[Value], index: usize) -> Result<&Value> {
    items.get(index).ok_or(IngestError::RecordIndexOutOfRange {
        index,
        available: items.len(),
    })
}

/// JSON truthiness: `null`, `false`, `0`, and `""` are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
