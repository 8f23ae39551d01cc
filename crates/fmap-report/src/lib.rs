//! Output generation for the field mapper.
//!
//! - **Mapping table**: key, formatted value and mapped field per discovered
//!   key, as tab-separated text or an HTML table
//! - **Narrative document**: composer output as markdown, plain text or HTML
//! - **Export**: delivery through an [`ExportSink`], falling back to plain
//!   text when rich delivery fails

mod document;
mod error;
mod export;
mod html;
mod table;

pub use document::NarrativeDocument;
pub use error::{ExportError, Result};
pub use export::{
    ExportContent, ExportOutcome, ExportSink, FileSink, PlainSink, export_with_fallback,
};
pub use table::{MappingTable, TABLE_HEADERS, TableRow};

/// Table export in both representations.
pub fn table_export(table: &MappingTable) -> Result<ExportContent> {
    Ok(ExportContent {
        name: "table".to_string(),
        plain: table.to_tsv(),
        html: table.to_html()?,
    })
}

/// Document export in both representations.
pub fn document_export(document: &NarrativeDocument) -> Result<ExportContent> {
    Ok(ExportContent {
        name: "document".to_string(),
        plain: document.to_plain_text(),
        html: document.to_html()?,
    })
}
