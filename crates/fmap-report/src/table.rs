//! Mapping table: one row per discovered key.

use fmap_map::{MappingState, is_ignored_key};
use fmap_model::{FlatRecord, format_value};

use crate::error::Result;
use crate::html::HtmlWriter;

/// Column headers, in order.
pub const TABLE_HEADERS: [&str; 3] = ["Key", "Value", "Mapped Field"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub key: String,
    /// Formatted value, `N/A` for null.
    pub value: String,
    /// Owning field, `None` when the key is unmapped.
    pub field: Option<&'static str>,
}

/// Keys, values and their mapped fields for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    pub rows: Vec<TableRow>,
}

impl MappingTable {
    /// Builds the table in discovery order, leaving out envelope keys.
    pub fn build(record: &FlatRecord, state: &MappingState) -> Self {
        let rows = record
            .iter()
            .filter(|(key, _)| !is_ignored_key(key))
            .map(|(key, value)| TableRow {
                key: key.to_string(),
                value: format_value(Some(value)),
                field: state.owner_of(key).map(|field| field.name),
            })
            .collect();
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Tab-separated text with a header row.
    ///
    /// Runs of whitespace inside a cell, newlines and tabs included, collapse
    /// to one space so every row stays on one line.
    pub fn to_tsv(&self) -> String {
        let mut out = TABLE_HEADERS.join("\t");
        out.push('\n');
        for row in &self.rows {
            let cells = [
                collapse_whitespace(&row.key),
                collapse_whitespace(&row.value),
                row.field.unwrap_or_default().to_string(),
            ];
            out.push_str(&cells.join("\t"));
            out.push('\n');
        }
        out
    }

    /// An HTML `<table>` fragment; values keep their line breaks in `<pre>`.
    pub fn to_html(&self) -> Result<String> {
        let mut html = HtmlWriter::new();
        html.start("table")?;
        html.start("thead")?;
        html.start("tr")?;
        for header in TABLE_HEADERS {
            html.element("th", header)?;
        }
        html.end("tr")?;
        html.end("thead")?;
        html.start("tbody")?;
        for row in &self.rows {
            html.start("tr")?;
            html.element("td", &row.key)?;
            html.start("td")?;
            html.element("pre", &row.value)?;
            html.end("td")?;
            html.element("td", row.field.unwrap_or_default())?;
            html.end("tr")?;
        }
        html.end("tbody")?;
        html.end("table")?;
        html.finish()
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
