// src/sink/records.rs
// =============================================================================
// Collects content records during a crawl and writes them out afterwards.
//
// Records are kept in the order they were discovered. Export writes either a
// CSV file (columns: url, title, content) or a pretty-printed JSON array.
// An empty sink writes nothing at all: export reports "nothing to export"
// instead of creating an empty file, and that is not an error.
// =============================================================================

use clap::ValueEnum;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

use crate::extract::ContentRecord;

// Output file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    // Picks JSON for a ".json" file and CSV for anything else
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

// Result of a successful export call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    Written { path: PathBuf, rows: usize },
    NothingToExport,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default)]
pub struct RecordSink {
    records: Vec<ContentRecord>,
}

impl RecordSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: ContentRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ContentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // Writes every collected record to `path`
    //
    // Returns NothingToExport (and touches no file) when no record was
    // collected. Any IO or serialization failure is returned to the caller.
    pub fn export(&self, path: &Path, format: ExportFormat) -> Result<ExportStatus, ExportError> {
        if self.is_empty() {
            info!("no records collected, nothing to export");
            return Ok(ExportStatus::NothingToExport);
        }

        let result = match format {
            ExportFormat::Csv => self.write_csv(path),
            ExportFormat::Json => self.write_json(path),
        };

        match result {
            Ok(()) => {
                info!(path = %path.display(), rows = self.len(), ?format, "records exported");
                Ok(ExportStatus::Written {
                    path: path.to_path_buf(),
                    rows: self.len(),
                })
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "export failed");
                Err(e)
            }
        }
    }

    fn write_csv(&self, path: &Path) -> Result<(), ExportError> {
        let mut writer = csv::Writer::from_path(path)?;
        for record in self.records() {
            writer.serialize(record)?;
        }
        writer.flush().map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_json(&self, path: &Path) -> Result<(), ExportError> {
        let io_error = |source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.records)?;
        writer.write_all(b"\n").map_err(io_error)?;
        writer.flush().map_err(io_error)
    }
}
