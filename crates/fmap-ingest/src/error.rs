//! Error types for input acquisition.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading and parsing a source record.
///
/// Every variant is blocking: no partial record is produced.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input file not found.
    #[error("input file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exceeds the maximum allowed size.
    #[error("file {path} is too large ({size} bytes, maximum {max_size})")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// Input is not UTF-8 text.
    #[error("unsupported encoding: {encoding}")]
    UnsupportedEncoding { encoding: &'static str },

    // === Parsing Errors ===
    /// Nothing to process.
    #[error("input is empty")]
    EmptyInput,

    #[error("failed to parse JSON: {source}")]
    JsonParse {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse CSV: {source}")]
    CsvParse {
        #[source]
        source: csv::Error,
    },

    // === Record Selection Errors ===
    /// No usable top-level object could be found.
    #[error("could not find a record to process: {reason}")]
    NoRecord { reason: String },

    /// Requested record index is past the end of the available records.
    #[error("record index {index} is out of range ({available} records available)")]
    RecordIndexOutOfRange { index: usize, available: usize },

    /// Nesting exceeded the flattening depth limit.
    #[error("record nesting exceeds the maximum depth of {max_depth}")]
    RecordTooDeep { max_depth: usize },
}

impl From<serde_json::Error> for IngestError {
    fn from(source: serde_json::Error) -> Self {
        Self::JsonParse { source }
    }
}

impl From<csv::Error> for IngestError {
    fn from(source: csv::Error) -> Self {
        Self::CsvParse { source }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
