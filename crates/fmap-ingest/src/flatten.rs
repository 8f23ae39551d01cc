//! Flattening nested records into dotted-path keys.

use fmap_model::FlatRecord;
use serde_json::{Map, Value};

use crate::error::{IngestError, Result};

/// Maximum object nesting followed by [`flatten`].
pub const MAX_FLATTEN_DEPTH: usize = 128;

/// Flattens a record into dotted-path leaves.
///
/// Objects are descended into; arrays and scalars are leaves. Arrays are never
/// descended, so objects inside them stay nested in the leaf value. Empty
/// nested objects produce no key.
pub fn flatten(record: &Map<String, Value>) -> Result<FlatRecord> {
    let mut flat = FlatRecord::new();
    flatten_into(record, "", 0, &mut flat)?;
    Ok(flat)
}

fn flatten_into(
    object: &Map<String, Value>,
    parent: &str,
    depth: usize,
    flat: &mut FlatRecord,
) -> Result<()> {
    if depth >= MAX_FLATTEN_DEPTH {
        return Err(IngestError::RecordTooDeep {
            max_depth: MAX_FLATTEN_DEPTH,
        });
    }
    for (key, value) in object {
        let path = if parent.is_empty() {
            key.clone()
        } else {
            format!("{parent}.{key}")
        };
        match value {
            Value::Object(child) => flatten_into(child, &path, depth + 1, flat)?,
            leaf => {
                flat.insert(path, leaf.clone());
            }
        }
    }
    Ok(())
}
