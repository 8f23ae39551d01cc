//! CSV input: one data row becomes one record.

use csv::ReaderBuilder;
use serde_json::{Map, Value};

use crate::error::{IngestError, Result};

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses CSV text and turns the data row at `index` into a record.
///
/// The first row is the header. Cells are kept as strings, blank headers are
/// skipped, and when a header repeats the first column wins.
pub fn parse_csv_record(text: &str, index: usize) -> Result<Map<String, Value>> {
    if text.trim().is_empty() {
        return Err(IngestError::EmptyInput);
    }
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
    if headers.iter().all(String::is_empty) {
        return Err(IngestError::NoRecord {
            reason: "CSV header row is empty".to_string(),
        });
    }

    let mut available = 0usize;
    for row in reader.records() {
        let row = row?;
        if available == index {
            let mut record = Map::new();
            for (header, cell) in headers.iter().zip(row.iter()) {
                if header.is_empty() || record.contains_key(header) {
                    continue;
                }
                record.insert(header.clone(), Value::String(cell.trim().to_string()));
            }
            return Ok(record);
        }
        available += 1;
    }

    if available == 0 {
        return Err(IngestError::NoRecord {
            reason: "CSV has a header row but no data rows".to_string(),
        });
    }
    Err(IngestError::RecordIndexOutOfRange { index, available })
}
