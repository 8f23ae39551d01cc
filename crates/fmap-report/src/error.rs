//! Export error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from rendering or delivering an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Markup writer failed.
    #[error("Failed to write markup: {0}")]
    Markup(String),

    /// File I/O error.
    #[error("Failed to {operation} export file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The sink cannot accept rich content.
    #[error("{sink} does not support rich content")]
    RichUnsupported { sink: &'static str },

    /// Rich delivery failed and the plain fallback failed as well.
    #[error("Export failed: {fallback}")]
    FallbackFailed {
        rich: Box<ExportError>,
        #[source]
        fallback: Box<ExportError>,
    },
}

impl ExportError {
    pub(crate) fn markup(error: impl std::fmt::Display) -> Self {
        Self::Markup(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
