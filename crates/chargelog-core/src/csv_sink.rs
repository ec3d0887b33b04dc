// ── CSV sink ──
//
// One file per (vehicle, epoch). The header is fixed by the first record
// written; later rows are projected onto that header.

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::record::FlatRecord;

/// File name format of the login timestamp.
pub const FILE_STAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// `<folder>/<YYYYMMDD-HHMMSS>.csv`, or `<folder>/<YYYYMMDD-HHMMSS>-<vin>.csv`
/// when a VIN suffix is requested.
pub fn csv_path(folder: &Path, login_time: NaiveDateTime, vin: Option<&str>) -> PathBuf {
    let stamp = login_time.format(FILE_STAMP_FORMAT);
    let name = match vin {
        Some(vin) => format!("{stamp}-{vin}.csv"),
        None => format!("{stamp}.csv"),
    };
    folder.join(name)
}

/// An open CSV file for one epoch.
///
/// Rows always match the header column set: columns a record lacks are
/// written as empty cells, and record keys the header does not know are
/// dropped (logged once per column).
pub struct CsvSink {
    path: PathBuf,
    writer: csv::Writer<File>,
    header: Option<Vec<String>>,
    known: HashSet<String>,
    dropped: HashSet<String>,
}

impl CsvSink {
    /// Create (or truncate) the file at `path`.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        let file = File::create(&path).map_err(|e| CoreError::io(&path, e))?;
        debug!(path = %path.display(), "opened CSV file");
        Ok(Self {
            writer: csv::WriterBuilder::new()
                .terminator(csv::Terminator::Any(b'\n'))
                .from_writer(file),
            path,
            header: None,
            known: HashSet::new(),
            dropped: HashSet::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The header, once the first record has been written.
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Append `record`, writing the header first if this is the first row.
    ///
    /// Data is flushed and synced to disk before returning.
    pub fn append(&mut self, record: &FlatRecord) -> Result<(), CoreError> {
        let header = match self.header.take() {
            Some(h) => h,
            None => {
                let h: Vec<String> = record.columns().map(str::to_owned).collect();
                self.writer
                    .write_record(&h)
                    .map_err(|e| CoreError::csv(&self.path, e))?;
                self.known = h.iter().cloned().collect();
                h
            }
        };

        for column in record.columns() {
            if !self.known.contains(column) && self.dropped.insert(column.to_owned()) {
                warn!(
                    path = %self.path.display(),
                    column,
                    "column not in CSV header, dropping"
                );
            }
        }

        let row = header.iter().map(|col| record.get(col).unwrap_or(""));
        let written = self.writer.write_record(row);
        self.header = Some(header);
        written.map_err(|e| CoreError::csv(&self.path, e))?;

        self.writer
            .flush()
            .map_err(|e| CoreError::io(&self.path, e))?;
        self.writer
            .get_ref()
            .sync_data()
            .map_err(|e| CoreError::io(&self.path, e))
    }

    /// Flush and close the file.
    pub fn close(self) -> Result<(), CoreError> {
        let path = self.path;
        let file = self
            .writer
            .into_inner()
            .map_err(|e| CoreError::io(&path, std::io::Error::other(e.to_string())))?;
        file.sync_all().map_err(|e| CoreError::io(&path, e))?;
        debug!(path = %path.display(), "closed CSV file");
        Ok(())
    }
}
