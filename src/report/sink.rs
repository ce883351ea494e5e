// src/report/sink.rs

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use strum::Display;
use tracing::debug;

use crate::core::errors::InputError;
use crate::core::models::ProbeResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// `.json` (any case) selects JSON, everything else is plain text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }
}

/// Accumulates results into the output file as they arrive.
///
/// JSON output is bracketed by hand so entries can be written one at a time.
pub struct OutputSink {
    writer: Box<dyn Write + Send>,
    format: OutputFormat,
    written: usize,
}

impl OutputSink {
    /// Creates (truncating) the output file.
    pub fn create(path: &Path) -> Result<Self, InputError> {
        let file = File::create(path).map_err(|source| InputError::CreateOutput {
            path: path.to_path_buf(),
            source,
        })?;
        let format = OutputFormat::from_path(path);
        debug!(path = %path.display(), %format, "Output file created.");
        Ok(Self::new(Box::new(BufWriter::new(file)), format)?)
    }

    pub fn new(mut writer: Box<dyn Write + Send>, format: OutputFormat) -> io::Result<Self> {
        if format == OutputFormat::Json {
            writer.write_all(b"[")?;
        }
        Ok(Self { writer, format, written: 0 })
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn write(&mut self, result: &ProbeResult) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                writeln!(self.writer, "{} - {}", result.subdomain, result.status_summary())?;
            }
            OutputFormat::Json => {
                if self.written > 0 {
                    self.writer.write_all(b",")?;
                }
                self.writer.write_all(b"\n")?;
                serde_json::to_writer_pretty(&mut self.writer, &result.to_record())?;
            }
        }
        self.written += 1;
        Ok(())
    }

    /// Closes the JSON array and flushes.
    pub fn finish(mut self) -> io::Result<usize> {
        if self.format == OutputFormat::Json {
            self.writer.write_all(b"\n]\n")?;
        }
        self.writer.flush()?;
        Ok(self.written)
    }
}
