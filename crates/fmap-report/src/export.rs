//! Delivering rendered output, with a plain-text fallback.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{ExportError, Result};

/// Rendered output in both representations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportContent {
    /// Base name of the export, e.g. `"table"`.
    pub name: String,
    pub plain: String,
    pub html: String,
}

/// A destination that accepts plain text and, optionally, HTML alongside it.
pub trait ExportSink {
    /// Short label used in log messages.
    fn label(&self) -> &'static str;

    /// Delivers plain text and HTML together.
    fn write_rich(&mut self, name: &str, plain: &str, html: &str) -> Result<()>;

    /// Delivers plain text only.
    fn write_plain(&mut self, name: &str, plain: &str) -> Result<()>;
}

/// How an export was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    Rich,
    /// Rich delivery failed and plain text was delivered instead.
    PlainOnly,
}

/// Writes `content` through `sink`, retrying plain-only when rich fails.
///
/// Only when both attempts fail is an error returned.
pub fn export_with_fallback(sink: &mut dyn ExportSink, content: &ExportContent) -> Result<ExportOutcome> {
    let rich = match sink.write_rich(&content.name, &content.plain, &content.html) {
        Ok(()) => {
            info!(sink = sink.label(), name = %content.name, "exported rich content");
            return Ok(ExportOutcome::Rich);
        }
        Err(error) => error,
    };
    warn!(
        sink = sink.label(),
        name = %content.name,
        error = %rich,
        "rich export failed, falling back to plain text"
    );
    match sink.write_plain(&content.name, &content.plain) {
        Ok(()) => {
            info!(sink = sink.label(), name = %content.name, "exported plain text");
            Ok(ExportOutcome::PlainOnly)
        }
        Err(fallback) => Err(ExportError::FallbackFailed {
            rich: Box::new(rich),
            fallback: Box::new(fallback),
        }),
    }
}

/// Writes `<name>.txt` and `<name>.html` into a directory.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write_file(&self, name: &str, extension: &str, contents: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|source| ExportError::Io {
            operation: "create directory for",
            path: self.dir.clone(),
            source,
        })?;
        let path = self.dir.join(format!("{name}.{extension}"));
        fs::write(&path, contents).map_err(|source| ExportError::Io {
            operation: "write",
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

impl ExportSink for FileSink {
    fn label(&self) -> &'static str {
        "file"
    }

    fn write_rich(&mut self, name: &str, plain: &str, html: &str) -> Result<()> {
        self.write_file(name, "txt", plain)?;
        self.write_file(name, "html", html)?;
        Ok(())
    }

    fn write_plain(&mut self, name: &str, plain: &str) -> Result<()> {
        self.write_file(name, "txt", plain)?;
        Ok(())
    }
}

/// Writes plain text to any writer; rich content is not supported.
pub struct PlainSink<W: Write> {
    writer: W,
}

impl<W: Write> PlainSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ExportSink for PlainSink<W> {
    fn label(&self) -> &'static str {
        "plain"
    }

    fn write_rich(&mut self, _name: &str, _plain: &str, _html: &str) -> Result<()> {
        Err(ExportError::RichUnsupported { sink: self.label() })
    }

    fn write_plain(&mut self, name: &str, plain: &str) -> Result<()> {
        self.writer
            .write_all(plain.as_bytes())
            .and_then(|()| self.writer.flush())
            .map_err(|source| ExportError::Io {
                operation: "write",
                path: PathBuf::from(name),
                source,
            })
    }
}
