//! Input acquisition for the field mapper.
//!
//! This crate turns raw JSON or CSV text into the single nested record that
//! mapping works on, and flattens that record into dotted-path keys.
//!
//! # Features
//!
//! - **Record selection**: API envelopes (`{"data": [...]}`), root objects and
//!   root arrays are all accepted
//! - **CSV rows**: the header row names the keys of the selected data row
//! - **Flattening**: nested objects become `parent.child` keys, arrays stay
//!   leaves
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use fmap_ingest::load_record;
//!
//! let source = load_record(Path::new("finding.json"), None, 0)?;
//! let flat = source.flatten()?;
//! ```

mod csv_record;
mod error;
mod flatten;
mod json;
mod reader;

use std::path::Path;

use fmap_model::{FlatRecord, SourceFormat};
use serde_json::{Map, Value};
use tracing::{debug, info};

// === Error Types ===
pub use error::{IngestError, Result};

// === Parsing ===
pub use csv_record::parse_csv_record;
pub use json::{parse_json_record, select_record};

// === Flattening ===
pub use flatten::{MAX_FLATTEN_DEPTH, flatten};

// === File Reading ===
pub use reader::{MAX_INPUT_FILE_SIZE, decode_text, detect_format, read_input};

/// The selected source record and the format it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    pub format: SourceFormat,
    pub record: Map<String, Value>,
}

impl SourceRecord {
    /// Parses `text` in the given format and selects the record at `index`.
    pub fn parse(text: &str, format: SourceFormat, index: usize) -> Result<Self> {
        let record = match format {
            SourceFormat::Json => parse_json_record(text, index)?,
            SourceFormat::Csv => parse_csv_record(text, index)?,
        };
        debug!(%format, index, keys = record.len(), "selected source record");
        Ok(Self { format, record })
    }

    /// Restores a record previously serialized with [`SourceRecord::to_json`].
    pub fn from_saved(text: &str, format: SourceFormat) -> Result<Self> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(record) => Ok(Self { format, record }),
            _ => Err(IngestError::NoRecord {
                reason: "saved record is not an object".to_string(),
            }),
        }
    }

    pub fn flatten(&self) -> Result<FlatRecord> {
        flatten(&self.record)
    }

    /// Compact JSON text of the selected record.
    pub fn to_json(&self) -> String {
        Value::Object(self.record.clone()).to_string()
    }
}

/// Reads `path` and selects the record at `index`.
///
/// When `format` is `None` it is detected from the extension or content.
pub fn load_record(path: &Path, format: Option<SourceFormat>, index: usize) -> Result<SourceRecord> {
    let text = read_input(path)?;
    let format = format.unwrap_or_else(|| detect_format(Some(path), &text));
    let source = SourceRecord::parse(&text, format, index)?;
    info!(
        path = %path.display(),
        %format,
        keys = source.record.len(),
        "loaded source record"
    );
    Ok(source)
}
