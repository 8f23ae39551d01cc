//! The `map` pipeline: load, seed, edit, render, persist and export.
//!
//! Loading and editing failures abort the run. Saving a preset and writing
//! exports are best effort: their failures are collected as notices and the
//! rest of the outcome is still returned.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use fmap_ingest::{SourceRecord, detect_format, load_record};
use fmap_map::{
    EditorEvent, EditorSession, MappingSummary, PresetRepository, RepositoryError, SavedMapping,
};
use fmap_model::SourceFormat;
use fmap_report::{
    ExportOutcome, FileSink, MappingTable, NarrativeDocument, document_export,
    export_with_fallback, table_export,
};
use tracing::{debug, info, warn};

use crate::logging::redact_value;
use crate::options::MapOptions;

/// How one export was delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub name: String,
    pub outcome: ExportOutcome,
}

/// Result of a `map` run.
#[derive(Debug, Clone)]
pub struct MapOutcome {
    pub session: EditorSession,
    pub format: SourceFormat,
    pub table: MappingTable,
    pub summary: MappingSummary,
    pub unmapped_keys: Vec<String>,
    pub document: NarrativeDocument,
    /// Path of the preset written by `--save-preset`.
    pub saved_preset: Option<PathBuf>,
    pub exports: Vec<ExportReport>,
    /// Non-fatal problems to show the user.
    pub notices: Vec<String>,
}

/// Runs the whole pipeline for `options`.
pub fn run_map(options: &MapOptions) -> Result<MapOutcome> {
    let (source, mut session) = open_session(options)?;
    apply_events(&mut session, &options.editor_events())?;

    let record = session.record().context("no record was processed")?;
    let table = MappingTable::build(record, session.state());
    for row in &table.rows {
        debug!(
            key = %row.key,
            value = redact_value(&row.value),
            field = row.field.unwrap_or_default(),
            "table row"
        );
    }
    let summary = session.state().summary();
    let unmapped_keys = session
        .unmapped_keys()
        .into_iter()
        .map(str::to_string)
        .collect();
    let document = NarrativeDocument::new(session.render()?);

    let mut notices = Vec::new();
    let saved_preset = match &options.save_preset {
        Some(name) => save_preset(options, name, &source, &session)
            .map_err(|error| {
                warn!(preset = %name, %error, "failed to save preset");
                notices.push(error.user_message());
            })
            .ok(),
        None => None,
    };

    let exports = match &options.output_dir {
        Some(dir) => export_outputs(dir, &table, &document, &mut notices),
        None => Vec::new(),
    };

    info!(
        taxonomy = %session.taxonomy(),
        mapped = summary.mapped_fields,
        total = summary.total_fields,
        "mapping complete"
    );
    Ok(MapOutcome {
        format: source.format,
        session,
        table,
        summary,
        unmapped_keys,
        document,
        saved_preset,
        exports,
        notices,
    })
}

/// Builds the session from a stored preset, an input file or stdin.
fn open_session(options: &MapOptions) -> Result<(SourceRecord, EditorSession)> {
    if let Some(name) = &options.preset {
        return open_preset(options, name);
    }

    let source = match &options.input {
        Some(path) => load_record(path, options.format, options.record_index)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => {
            let text = io::read_to_string(io::stdin()).context("failed to read stdin")?;
            let format = options
                .format
                .unwrap_or_else(|| detect_format(None, &text));
            SourceRecord::parse(&text, format, options.record_index)
                .context("failed to parse stdin")?
        }
    };
    let flat = source.flatten().context("failed to flatten record")?;
    let mut session = EditorSession::new(options.taxonomy_or_default());
    session.process(flat);
    Ok((source, session))
}

fn open_preset(options: &MapOptions, name: &str) -> Result<(SourceRecord, EditorSession)> {
    let repository = PresetRepository::new(&options.preset_dir)
        .map_err(|error| anyhow!(error.user_message()))?;
    let preset = repository
        .load(name)
        .map_err(|error| anyhow!(error.user_message()))?
        .ok_or_else(|| anyhow!("no preset named '{name}' in {}", options.preset_dir.display()))?;

    let source = SourceRecord::from_saved(&preset.source_record, preset.provenance)
        .with_context(|| format!("preset '{name}' holds an unreadable record"))?;
    let flat = source.flatten().context("failed to flatten record")?;

    let session = match options.taxonomy {
        Some(taxonomy) if taxonomy != preset.taxonomy() => {
            warn!(
                preset = %name,
                stored = %preset.taxonomy(),
                requested = %taxonomy,
                "taxonomy differs from preset, mapping re-seeded"
            );
            let mut session = EditorSession::new(taxonomy);
            session.process(flat);
            session
        }
        _ => EditorSession::restore(flat, &preset.mapping)
            .with_context(|| format!("preset '{name}' cannot be restored"))?,
    };
    Ok((source, session))
}

fn apply_events(session: &mut EditorSession, events: &[EditorEvent]) -> Result<()> {
    for event in events {
        session.apply(event).with_context(|| match event {
            EditorEvent::SetFieldForKey { field, key } => format!("--set {field}={key}"),
            EditorEvent::ClearField(field) => format!("--clear {field}"),
            EditorEvent::ReorderComposerEntry { key, index } => format!("--move {key}={index}"),
        })?;
    }
    Ok(())
}

fn save_preset(
    options: &MapOptions,
    name: &str,
    source: &SourceRecord,
    session: &EditorSession,
) -> std::result::Result<PathBuf, RepositoryError> {
    let repository = PresetRepository::new(&options.preset_dir)?;
    let preset = SavedMapping::new(name, source.format, source.to_json(), session.state());
    repository.save(&preset)
}

fn export_outputs(
    dir: &std::path::Path,
    table: &MappingTable,
    document: &NarrativeDocument,
    notices: &mut Vec<String>,
) -> Vec<ExportReport> {
    let mut sink = FileSink::new(dir);
    let mut reports = Vec::new();
    let contents = [table_export(table), document_export(document)];
    for content in contents {
        let result = content.and_then(|content| {
            export_with_fallback(&mut sink, &content).map(|outcome| ExportReport {
                name: content.name,
                outcome,
            })
        });
        match result {
            Ok(report) => {
                if report.outcome == ExportOutcome::PlainOnly {
                    notices.push(format!("{} was exported as plain text only", report.name));
                }
                reports.push(report);
            }
            Err(error) => {
                warn!(dir = %dir.display(), %error, "export failed");
                notices.push(format!("Export to {} failed: {error}", dir.display()));
            }
        }
    }
    reports
}
