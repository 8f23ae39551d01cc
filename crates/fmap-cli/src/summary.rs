use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use fmap_cli::pipeline::{ExportReport, MapOutcome};
use fmap_map::MappingSummary;
use fmap_report::{ExportOutcome, MappingTable, TABLE_HEADERS};

pub fn print_map_outcome(outcome: &MapOutcome) {
    println!(
        "Taxonomy: {} (input: {})",
        outcome.session.taxonomy().label(),
        outcome.format
    );
    if outcome.table.is_empty() {
        println!("The record has no mappable keys.");
    } else {
        println!("{}", mapping_table(&outcome.table));
    }
    print_mapping_summary(&outcome.summary, &outcome.unmapped_keys);

    if !outcome.document.is_empty() {
        println!();
        print!("{}", outcome.document.to_markdown());
    }

    if let Some(path) = &outcome.saved_preset {
        println!();
        println!("Preset saved: {}", path.display());
    }
    if !outcome.exports.is_empty() {
        println!();
        println!("{}", export_table(&outcome.exports));
    }
    for notice in &outcome.notices {
        eprintln!("warning: {notice}");
    }
}

fn mapping_table(table: &MappingTable) -> Table {
    let mut out = Table::new();
    out.set_header(TABLE_HEADERS.map(header_cell));
    apply_mapping_table_style(&mut out);
    for row in &table.rows {
        let field = match row.field {
            Some(field) => Cell::new(field).fg(Color::Green),
            None => dim_cell("-"),
        };
        out.add_row(vec![Cell::new(&row.key), Cell::new(&row.value), field]);
    }
    out
}

fn print_mapping_summary(summary: &MappingSummary, unmapped_keys: &[String]) {
    println!(
        "Mapped {} of {} {} fields",
        summary.mapped_fields,
        summary.total_fields,
        summary.taxonomy.label()
    );
    if summary.unmapped_count() > 0 {
        println!("Unmapped fields:");
        for (category, fields) in &summary.unmapped_by_category {
            match category {
                Some(category) => println!("  {category}: {}", fields.join(", ")),
                None => println!("  {}", fields.join(", ")),
            }
        }
    }
    if !unmapped_keys.is_empty() {
        println!("Unmapped keys: {}", unmapped_keys.join(", "));
    }
}

fn export_table(exports: &[ExportReport]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Export"), header_cell("Delivered")]);
    apply_table_style(&mut table);
    for report in exports {
        let delivered = match report.outcome {
            ExportOutcome::Rich => Cell::new("text + html").fg(Color::Green),
            ExportOutcome::PlainOnly => Cell::new("text only").fg(Color::Yellow),
        };
        table.add_row(vec![Cell::new(&report.name), delivered]);
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_mapping_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
    table.set_constraints(vec![
        ColumnConstraint::UpperBoundary(Width::Percentage(35)),
        ColumnConstraint::UpperBoundary(Width::Percentage(45)),
        ColumnConstraint::LowerBoundary(Width::Fixed(12)),
    ]);
}

pub fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
