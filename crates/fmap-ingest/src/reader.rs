//! Reading input files into text.

use std::path::Path;

use fmap_model::SourceFormat;

use crate::error::{IngestError, Result};

/// Maximum input size (64 MB).
pub const MAX_INPUT_FILE_SIZE: u64 = 64 * 1024 * 1024;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Reads an input file as UTF-8 text, enforcing [`MAX_INPUT_FILE_SIZE`].
pub fn read_input(path: &Path) -> Result<String> {
    read_input_with_limit(path, MAX_INPUT_FILE_SIZE)
}

/// Reads an input file against a custom size limit.
pub fn read_input_with_limit(path: &Path, max_size: u64) -> Result<String> {
    let metadata = std::fs::metadata(path).map_err(|e| io_error(path, e))?;
    if metadata.len() > max_size {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size,
        });
    }
    let bytes = std::fs::read(path).map_err(|e| io_error(path, e))?;
    decode_text(&bytes)
}

/// Decodes raw bytes as UTF-8, dropping a UTF-8 BOM.
///
/// UTF-16 input is rejected rather than guessed at.
pub fn decode_text(bytes: &[u8]) -> Result<String> {
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return Err(IngestError::UnsupportedEncoding {
            encoding: "UTF-16 LE",
        });
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return Err(IngestError::UnsupportedEncoding {
            encoding: "UTF-16 BE",
        });
    }
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    String::from_utf8(bytes.to_vec()).map_err(|_| IngestError::UnsupportedEncoding {
        encoding: "non-UTF-8",
    })
}

/// Guesses the input format from the file extension, then from the content.
///
/// Content that starts with `{` or `[` is JSON, anything else is CSV.
pub fn detect_format(path: Option<&Path>, text: &str) -> SourceFormat {
    let by_extension = path
        .and_then(|p| p.extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match by_extension.as_deref() {
        Some("json") => SourceFormat::Json,
        Some("csv") => SourceFormat::Csv,
        _ => {
            let trimmed = text.trim_start();
            if trimmed.starts_with('{') || trimmed.starts_with('[') {
                SourceFormat::Json
            } else {
                SourceFormat::Csv
            }
        }
    }
}

fn io_error(path: &Path, e: std::io::Error) -> IngestError {
    if e.kind() == std::io::ErrorKind::NotFound {
        IngestError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        }
    }
}
