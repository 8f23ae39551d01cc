//! CLI argument definitions for the field mapper.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use fmap_cli::options::{DEFAULT_PRESET_DIR, MapOptions, parse_assignment, parse_move};
use fmap_model::{SourceFormat, Taxonomy};

#[derive(Parser)]
#[command(
    name = "fmap",
    version,
    about = "Map security finding and asset records onto a fixed field taxonomy",
    long_about = "Map security finding and asset records onto a fixed field taxonomy.\n\n\
                  Reads a JSON or CSV record, proposes a target field for every key,\n\
                  applies manual corrections and composes a narrative document."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include record values in log output (redacted by default).
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Map a record and print the table, summary and composed document.
    Map(MapArgs),

    /// List the fields of a taxonomy.
    Fields(TaxonomyArgs),

    /// Show which field each key resolves to, and by which rule.
    Resolve(ResolveArgs),

    /// Manage stored presets.
    Presets(PresetsArgs),
}

#[derive(Args)]
pub struct MapArgs {
    /// Input file (JSON or CSV). Reads stdin when omitted.
    #[arg(value_name = "INPUT", conflicts_with = "preset")]
    pub input: Option<PathBuf>,

    /// Target taxonomy (default: finding, or the preset's own).
    #[arg(long = "taxonomy", value_enum)]
    pub taxonomy: Option<TaxonomyArg>,

    /// Input format.
    #[arg(long = "format", value_enum, default_value = "auto")]
    pub format: InputFormatArg,

    /// Record to select from an envelope, array or CSV file (0-based).
    #[arg(long = "record", value_name = "N", default_value_t = 0)]
    pub record: usize,

    /// Load a stored preset instead of reading input.
    #[arg(long = "preset", value_name = "NAME")]
    pub preset: Option<String>,

    /// Bind KEY to FIELD (use None as FIELD to unmap the key).
    #[arg(long = "set", value_name = "FIELD=KEY")]
    pub set: Vec<String>,

    /// Unbind every key of FIELD.
    #[arg(long = "clear", value_name = "FIELD")]
    pub clear: Vec<String>,

    /// Move a composer entry to INDEX.
    #[arg(long = "move", value_name = "KEY=INDEX")]
    pub moves: Vec<String>,

    /// Save the resulting mapping as a preset.
    #[arg(long = "save-preset", value_name = "NAME")]
    pub save_preset: Option<String>,

    #[command(flatten)]
    pub preset_dir: PresetDirArgs,

    /// Write table and document exports into DIR.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

impl MapArgs {
    /// Validates the editor flags and assembles [`MapOptions`].
    pub fn to_options(&self) -> anyhow::Result<MapOptions> {
        let sets = self
            .set
            .iter()
            .map(|text| parse_assignment(text))
            .collect::<anyhow::Result<Vec<_>>>()?;
        let moves = self
            .moves
            .iter()
            .map(|text| parse_move(text))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(MapOptions {
            input: self.input.clone(),
            taxonomy: self.taxonomy.map(Taxonomy::from),
            format: self.format.into(),
            record_index: self.record,
            preset: self.preset.clone(),
            clears: self.clear.clone(),
            sets,
            moves,
            save_preset: self.save_preset.clone(),
            preset_dir: self.preset_dir.preset_dir.clone(),
            output_dir: self.output_dir.clone(),
        })
    }
}

#[derive(Args)]
pub struct TaxonomyArgs {
    /// Target taxonomy.
    #[arg(long = "taxonomy", value_enum, default_value = "finding")]
    pub taxonomy: TaxonomyArg,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Source keys, dotted paths allowed.
    #[arg(value_name = "KEY", required = true)]
    pub keys: Vec<String>,

    #[command(flatten)]
    pub taxonomy: TaxonomyArgs,
}

#[derive(Args)]
pub struct PresetDirArgs {
    /// Directory holding stored presets.
    #[arg(long = "preset-dir", value_name = "DIR", default_value = DEFAULT_PRESET_DIR)]
    pub preset_dir: PathBuf,
}

#[derive(Args)]
pub struct PresetsArgs {
    #[command(subcommand)]
    pub command: PresetsCommand,

    #[command(flatten)]
    pub preset_dir: PresetDirArgs,
}

#[derive(Subcommand)]
pub enum PresetsCommand {
    /// List stored presets.
    List,

    /// Delete a stored preset.
    Delete {
        #[arg(value_name = "NAME")]
        name: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TaxonomyArg {
    Finding,
    Asset,
}

impl From<TaxonomyArg> for Taxonomy {
    fn from(arg: TaxonomyArg) -> Self {
        match arg {
            TaxonomyArg::Finding => Taxonomy::Finding,
            TaxonomyArg::Asset => Taxonomy::Asset,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum InputFormatArg {
    Auto,
    Json,
    Csv,
}

impl From<InputFormatArg> for Option<SourceFormat> {
    fn from(arg: InputFormatArg) -> Self {
        match arg {
            InputFormatArg::Auto => None,
            InputFormatArg::Json => Some(SourceFormat::Json),
            InputFormatArg::Csv => Some(SourceFormat::Csv),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
