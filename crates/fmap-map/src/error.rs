//! Error types for mapping operations.

use std::path::PathBuf;

use fmap_model::Taxonomy;
use thiserror::Error;

/// Errors from mapping operations.
///
/// Conflicts between bindings are never errors: they are resolved by the
/// transition itself. What remains are references to things that do not exist.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MappingError {
    /// Field is not part of the active taxonomy.
    #[error("Field '{field}' is not part of the {taxonomy} taxonomy")]
    UnknownField { taxonomy: Taxonomy, field: String },

    /// Key was not discovered in the loaded record.
    #[error("Source key not found: {0}")]
    KeyNotFound(String),

    /// Key has no entry in the composer layout.
    #[error("Key '{0}' is not part of the composed document")]
    EntryNotFound(String),

    /// An operation needs a processed record but none is loaded.
    #[error("No record has been processed")]
    NoRecord,
}

impl MappingError {
    /// Get the field name associated with this error, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::UnknownField { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Get the source key associated with this error, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::KeyNotFound(key) | Self::EntryNotFound(key) => Some(key),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MappingError>;

/// Errors from the preset repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// File I/O error.
    #[error("Failed to {operation} preset file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Name normalises to nothing usable as a file name.
    #[error("Invalid preset name: '{0}'")]
    InvalidName(String),

    #[error("Failed to serialize preset '{name}'")]
    Serialization {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse preset file: {path}")]
    Deserialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Stored format version is newer than this build understands.
    #[error("Preset format version {found} is not supported (expected {supported})")]
    UnsupportedVersion {
        found: String,
        supported: &'static str,
        path: PathBuf,
    },

    /// Temp file could not be renamed over the target.
    #[error("Failed to complete save of {target_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RepositoryError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => format!("Could not {} the preset file at {}", operation, path.display()),
            Self::InvalidName(name) => {
                format!("'{name}' cannot be used as a preset name. Use letters or digits.")
            }
            Self::Serialization { name, .. } => {
                format!("An error occurred while saving the preset '{name}'.")
            }
            Self::Deserialization { path, .. } => format!(
                "The preset file at {} could not be read. The file may be corrupted.",
                path.display()
            ),
            Self::UnsupportedVersion { found, path, .. } => format!(
                "The preset file at {} was written by a newer version (format {}).",
                path.display(),
                found
            ),
            Self::AtomicWriteFailed { target_path, .. } => format!(
                "Could not save the preset to {}. Please check disk space and permissions.",
                target_path.display()
            ),
        }
    }
}

pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;
