//! Preset repository for persisting and reusing mappings.
//!
//! Each preset is one JSON file holding the name, the selected source record
//! as JSON text, the input format it came from and a snapshot of the mapping.
//! File names are derived from the preset name case-insensitively, so `Weekly`
//! and `WEEKLY` address the same preset. Any other character is escaped, so
//! `weekly scan` and `weekly-scan` stay apart.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fmap_model::{SourceFormat, Taxonomy};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{RepositoryError, RepositoryResult as Result};
use crate::state::{MappingSnapshot, MappingState};

/// Version written into every stored preset.
pub const PRESET_FORMAT_VERSION: &str = "1.0";

fn default_version() -> String {
    PRESET_FORMAT_VERSION.to_string()
}

/// A named mapping with the record it was made for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedMapping {
    pub name: String,
    /// Input format the record was read from.
    pub provenance: SourceFormat,
    /// The selected source record as compact JSON text.
    pub source_record: String,
    #[serde(flatten)]
    pub mapping: MappingSnapshot,
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(default = "default_version")]
    pub version: String,
}

impl SavedMapping {
    pub fn new(
        name: impl Into<String>,
        provenance: SourceFormat,
        source_record: impl Into<String>,
        state: &MappingState,
    ) -> Self {
        Self {
            name: name.into(),
            provenance,
            source_record: source_record.into(),
            mapping: state.to_snapshot(),
            saved_at: Some(Utc::now()),
            version: default_version(),
        }
    }

    pub fn taxonomy(&self) -> Taxonomy {
        self.mapping.taxonomy
    }
}

/// Summary of a stored preset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetMetadata {
    pub name: String,
    pub taxonomy: Taxonomy,
    pub provenance: SourceFormat,
    pub saved_at: Option<DateTime<Utc>>,
    /// Number of bound fields.
    pub mapped_fields: usize,
    pub file_path: PathBuf,
}

/// Directory of preset files.
#[derive(Debug, Clone)]
pub struct PresetRepository {
    base_dir: PathBuf,
}

impl PresetRepository {
    /// Opens the repository at `base_dir`, creating the directory if needed.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).map_err(|source| RepositoryError::Io {
            operation: "create directory for",
            path: base_dir.clone(),
            source,
        })?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Writes `preset`, replacing any preset whose name differs only in case.
    pub fn save(&self, preset: &SavedMapping) -> Result<PathBuf> {
        let path = self.preset_path(&preset.name)?;
        if path.exists() {
            info!(name = %preset.name, "replacing existing preset");
        }
        let json = serde_json::to_string_pretty(preset).map_err(|source| {
            RepositoryError::Serialization {
                name: preset.name.clone(),
                source,
            }
        })?;

        let temp_path = path.with_extension("json.tmp");
        let mut file = File::create(&temp_path).map_err(|source| RepositoryError::Io {
            operation: "create",
            path: temp_path.clone(),
            source,
        })?;
        file.write_all(json.as_bytes())
            .map_err(|source| RepositoryError::Io {
                operation: "write",
                path: temp_path.clone(),
                source,
            })?;
        file.sync_all().map_err(|source| RepositoryError::Io {
            operation: "sync",
            path: temp_path.clone(),
            source,
        })?;
        fs::rename(&temp_path, &path).map_err(|source| RepositoryError::AtomicWriteFailed {
            temp_path: temp_path.clone(),
            target_path: path.clone(),
            source,
        })?;

        info!(
            name = %preset.name,
            taxonomy = %preset.taxonomy(),
            path = %path.display(),
            "saved preset"
        );
        Ok(path)
    }

    /// Loads a preset by name. Returns `None` if it does not exist.
    pub fn load(&self, name: &str) -> Result<Option<SavedMapping>> {
        let path = self.preset_path(name)?;
        if !path.exists() {
            return Ok(None);
        }
        read_preset(&path).map(Some)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.preset_path(name).is_ok_and(|path| path.exists())
    }

    /// Lists stored presets sorted by name, ignoring case.
    ///
    /// Files that fail to parse are skipped with a warning.
    pub fn list(&self) -> Result<Vec<PresetMetadata>> {
        let entries = fs::read_dir(&self.base_dir).map_err(|source| RepositoryError::Io {
            operation: "read",
            path: self.base_dir.clone(),
            source,
        })?;

        let mut presets = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| RepositoryError::Io {
                    operation: "read",
                    path: self.base_dir.clone(),
                    source,
                })?
                .path();
            if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match read_preset(&path) {
                Ok(preset) => presets.push(PresetMetadata {
                    taxonomy: preset.taxonomy(),
                    provenance: preset.provenance,
                    saved_at: preset.saved_at,
                    mapped_fields: preset.mapping.bindings.len(),
                    name: preset.name,
                    file_path: path,
                }),
                Err(error) => warn!(path = %path.display(), %error, "skipping unreadable preset"),
            }
        }

        presets.sort_by_key(|preset| preset.name.to_lowercase());
        Ok(presets)
    }

    /// Deletes a preset. Returns whether one existed.
    pub fn delete(&self, name: &str) -> Result<bool> {
        let path = self.preset_path(name)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|source| RepositoryError::Io {
            operation: "delete",
            path: path.clone(),
            source,
        })?;
        info!(name, "deleted preset");
        Ok(true)
    }

    fn preset_path(&self, name: &str) -> Result<PathBuf> {
        if !name.chars().any(char::is_alphanumeric) {
            return Err(RepositoryError::InvalidName(name.to_string()));
        }
        Ok(self.base_dir.join(format!("{}.json", normalize_name(name))))
    }
}

fn read_preset(path: &Path) -> Result<SavedMapping> {
    let contents = fs::read_to_string(path).map_err(|source| RepositoryError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source,
    })?;
    let preset: SavedMapping =
        serde_json::from_str(&contents).map_err(|source| RepositoryError::Deserialization {
            path: path.to_path_buf(),
            source,
        })?;
    if !preset.version.starts_with("1.") {
        return Err(RepositoryError::UnsupportedVersion {
            found: preset.version,
            supported: PRESET_FORMAT_VERSION,
            path: path.to_path_buf(),
        });
    }
    Ok(preset)
}

/// Case-folds a preset name into a file stem.
///
/// ASCII letters and digits are kept; every other byte of the folded name is
/// written as `_` plus two hex digits, so names that differ by more than case
/// never share a file.
fn normalize_name(name: &str) -> String {
    let folded = name.trim().to_lowercase();
    let mut stem = String::with_capacity(folded.len());
    for byte in folded.bytes() {
        if byte.is_ascii_alphanumeric() {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("_{byte:02x}"));
        }
    }
    stem
}
