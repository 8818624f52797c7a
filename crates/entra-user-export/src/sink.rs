//! Output records and where they go.

use chrono::Local;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::ExportResult;

/// One entry of the output document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExportRecord {
    /// Core fields plus the selected fields.
    User(Map<String, Value>),
    /// A record that could not be normalized, with whatever could be read
    /// from it.
    Failed {
        user: Map<String, Value>,
        error: String,
    },
}

impl ExportRecord {
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Projected fields, whichever variant this is.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        match self {
            Self::User(fields) | Self::Failed { user: fields, .. } => fields,
        }
    }
}

/// Destination for the finished export.
///
/// The whole ordered sequence is handed over in a single call once every
/// record has been processed.
pub trait RecordSink {
    fn write_records(&mut self, records: &[ExportRecord]) -> ExportResult<()>;
}

/// Collects records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<ExportRecord>,
}

impl RecordSink for MemorySink {
    fn write_records(&mut self, records: &[ExportRecord]) -> ExportResult<()> {
        self.records = records.to_vec();
        Ok(())
    }
}

/// Writes records as a pretty-printed JSON array.
///
/// The document is written to a temporary sibling and renamed into place,
/// so the target path never holds a partial export.
#[derive(Debug)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    /// Targets `users_output_<YYYYmmdd_HHMMSS>.json` inside `dir`.
    #[must_use]
    pub fn timestamped(dir: impl AsRef<Path>) -> Self {
        let ts = Local::now().format("%Y%m%d_%H%M%S");
        Self {
            path: dir.as_ref().join(format!("users_output_{ts}.json")),
        }
    }

    /// Targets an explicit file path.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for JsonFileSink {
    fn write_records(&mut self, records: &[ExportRecord]) -> ExportResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        if let Err(e) = write_then_rename(&tmp_path, &self.path, records) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        debug!("Saved to {}", self.path.display());
        Ok(())
    }
}

fn write_then_rename(tmp_path: &Path, path: &Path, records: &[ExportRecord]) -> ExportResult<()> {
    let mut file = fs::File::create(tmp_path)?;
    serde_json::to_writer_pretty(&mut file, records)?;
    file.write_all(b"\n")?;
    file.sync_all()?;
    drop(file);

    fs::rename(tmp_path, path)?;
    Ok(())
}
