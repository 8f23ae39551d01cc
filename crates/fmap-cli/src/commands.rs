use anyhow::{Result, anyhow};
use comfy_table::{Cell, CellAlignment, Table};
use fmap_cli::pipeline::{MapOutcome, run_map};
use fmap_map::{PresetRepository, ResolutionRule, resolve_explained};
use fmap_model::{Taxonomy, fields_for};
use tracing::info;

use crate::cli::{MapArgs, PresetsArgs, PresetsCommand, ResolveArgs, TaxonomyArgs};
use crate::summary::{align_column, apply_table_style, dim_cell, header_cell};

pub fn run_map_command(args: &MapArgs) -> Result<MapOutcome> {
    let options = args.to_options()?;
    run_map(&options)
}

pub fn run_fields(args: &TaxonomyArgs) -> Result<()> {
    let taxonomy = Taxonomy::from(args.taxonomy);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Category"),
        header_cell("Field"),
        header_cell("Multiplicity"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    for group in fields_for(taxonomy) {
        let category = group.category.unwrap_or("-");
        for field in group.fields {
            let multiplicity = if field.is_multi() { "multi" } else { "single" };
            table.add_row(vec![category, field.name, multiplicity]);
        }
    }
    println!("{} fields", taxonomy.label());
    println!("{table}");
    Ok(())
}

pub fn run_resolve(args: &ResolveArgs) -> Result<()> {
    let taxonomy = Taxonomy::from(args.taxonomy.taxonomy);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Key"),
        header_cell("Field"),
        header_cell("Rule"),
    ]);
    apply_table_style(&mut table);
    for key in &args.keys {
        match resolve_explained(key, taxonomy) {
            Some(resolution) => {
                table.add_row(vec![
                    Cell::new(key),
                    Cell::new(resolution.field.name),
                    Cell::new(rule_label(resolution.rule)),
                ]);
            }
            None => {
                table.add_row(vec![
                    Cell::new(key),
                    dim_cell("None"),
                    dim_cell("-"),
                ]);
            }
        }
    }
    println!("{table}");
    Ok(())
}

pub fn run_presets(args: &PresetsArgs) -> Result<()> {
    let repository = PresetRepository::new(&args.preset_dir.preset_dir)
        .map_err(|error| anyhow!(error.user_message()))?;
    match &args.command {
        PresetsCommand::List => {
            let presets = repository
                .list()
                .map_err(|error| anyhow!(error.user_message()))?;
            if presets.is_empty() {
                println!("No presets in {}", repository.base_dir().display());
                return Ok(());
            }
            let mut table = Table::new();
            table.set_header(vec![
                header_cell("Name"),
                header_cell("Taxonomy"),
                header_cell("Input"),
                header_cell("Mapped"),
                header_cell("Saved"),
            ]);
            apply_table_style(&mut table);
            align_column(&mut table, 3, CellAlignment::Right);
            for preset in presets {
                let saved = preset
                    .saved_at
                    .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string());
                table.add_row(vec![
                    preset.name,
                    preset.taxonomy.label().to_string(),
                    preset.provenance.to_string(),
                    preset.mapped_fields.to_string(),
                    saved,
                ]);
            }
            println!("{table}");
        }
        PresetsCommand::Delete { name } => {
            let deleted = repository
                .delete(name)
                .map_err(|error| anyhow!(error.user_message()))?;
            if !deleted {
                return Err(anyhow!("no preset named '{name}'"));
            }
            info!(preset = %name, "deleted preset");
            println!("Deleted preset '{name}'");
        }
    }
    Ok(())
}

fn rule_label(rule: ResolutionRule) -> String {
    match rule {
        ResolutionRule::ExactName => "exact name".to_string(),
        ResolutionRule::Alias { index } => format!("alias #{index}"),
        ResolutionRule::TagFallback => "tag fallback".to_string(),
    }
}
