//! Typed options for the `map` command.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use fmap_map::EditorEvent;
use fmap_model::{SourceFormat, Taxonomy};

/// Default directory for stored presets, relative to the working directory.
pub const DEFAULT_PRESET_DIR: &str = ".fmap/presets";

/// Everything `fmap map` needs, assembled from the command-line flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapOptions {
    /// Input file; stdin when `None` and no preset is given.
    pub input: Option<PathBuf>,
    /// Requested taxonomy. A preset keeps its own unless this is set.
    pub taxonomy: Option<Taxonomy>,
    /// Input format, detected when `None`.
    pub format: Option<SourceFormat>,
    /// Index of the record to select from an envelope, array or CSV file.
    pub record_index: usize,
    /// Preset to load instead of reading input.
    pub preset: Option<String>,
    pub clears: Vec<String>,
    /// `(field, key)` pairs from `--set FIELD=KEY`.
    pub sets: Vec<(String, String)>,
    /// `(key, index)` pairs from `--move KEY=INDEX`.
    pub moves: Vec<(String, usize)>,
    pub save_preset: Option<String>,
    pub preset_dir: PathBuf,
    pub output_dir: Option<PathBuf>,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            input: None,
            taxonomy: None,
            format: None,
            record_index: 0,
            preset: None,
            clears: Vec::new(),
            sets: Vec::new(),
            moves: Vec::new(),
            save_preset: None,
            preset_dir: PathBuf::from(DEFAULT_PRESET_DIR),
            output_dir: None,
        }
    }
}

impl MapOptions {
    /// Editor events in application order: clears, then sets, then moves.
    pub fn editor_events(&self) -> Vec<EditorEvent> {
        let clears = self.clears.iter().cloned().map(EditorEvent::ClearField);
        let sets = self
            .sets
            .iter()
            .map(|(field, key)| EditorEvent::SetFieldForKey {
                field: field.clone(),
                key: key.clone(),
            });
        let moves = self
            .moves
            .iter()
            .map(|(key, index)| EditorEvent::ReorderComposerEntry {
                key: key.clone(),
                index: *index,
            });
        clears.chain(sets).chain(moves).collect()
    }

    /// Taxonomy used when processing fresh input.
    pub fn taxonomy_or_default(&self) -> Taxonomy {
        self.taxonomy.unwrap_or(Taxonomy::Finding)
    }
}

/// Parses `FIELD=KEY`, splitting at the first `=`.
///
/// Field names never contain `=`; keys may.
pub fn parse_assignment(text: &str) -> Result<(String, String)> {
    let (field, key) = text
        .split_once('=')
        .ok_or_else(|| anyhow!("expected FIELD=KEY, got '{text}'"))?;
    let (field, key) = (field.trim(), key.trim());
    if field.is_empty() || key.is_empty() {
        bail!("expected FIELD=KEY, got '{text}'");
    }
    Ok((field.to_string(), key.to_string()))
}

/// Parses `KEY=INDEX`, splitting at the last `=`.
pub fn parse_move(text: &str) -> Result<(String, usize)> {
    let (key, index) = text
        .rsplit_once('=')
        .ok_or_else(|| anyhow!("expected KEY=INDEX, got '{text}'"))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("expected KEY=INDEX, got '{text}'");
    }
    let index = index
        .trim()
        .parse::<usize>()
        .with_context(|| format!("invalid index in '{text}'"))?;
    Ok((key.to_string(), index))
}
