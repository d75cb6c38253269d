//! Storage of the most recently uploaded occurrence spreadsheet

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::ingest::{self, IngestOptions, Occurrence, ParseError};

/// File name of the stored upload inside the data directory
pub const STORAGE_FILE_NAME: &str = "occurrences.xlsx";

/// Extensions accepted for upload. Every one of them decodes correctly from
/// the fixed `.xlsx` storage path.
pub const UPLOAD_EXTENSIONS: &[&str] = &["xls", "xlsx", "xlsm", "xltx"];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("file is not an Excel workbook (expected one of: .{})", UPLOAD_EXTENSIONS.join(", ."))]
    UnsupportedExtension(String),

    #[error("failed to store upload at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to process Excel file: {0}")]
    Parse(#[from] ParseError),
}

/// Single-slot spreadsheet store.
///
/// No records are cached: every read re-parses the stored file, so a read
/// racing an upload may observe a partially written file.
#[derive(Debug, Clone)]
pub struct OccurrenceStore {
    path: PathBuf,
    options: Arc<IngestOptions>,
}

impl OccurrenceStore {
    /// Open the store rooted at `data_dir`, creating the directory if needed
    pub fn new(data_dir: &Path, options: IngestOptions) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        Ok(Self {
            path: data_dir.join(STORAGE_FILE_NAME),
            options: Arc::new(options),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse the stored spreadsheet. Nothing uploaded yet means no records.
    pub fn load(&self) -> Result<Vec<Occurrence>, ParseError> {
        if !self.path.exists() {
            log::debug!("No upload at {}, returning empty list", self.path.display());
            return Ok(Vec::new());
        }
        ingest::parse_with(&self.path, &self.options)
    }

    /// Replace the stored spreadsheet and validate it by parsing.
    ///
    /// Returns the number of records found in the new file.
    pub fn save_upload(&self, file_name: &str, bytes: &[u8]) -> Result<usize, UploadError> {
        if !has_upload_extension(file_name) {
            return Err(UploadError::UnsupportedExtension(file_name.to_string()));
        }

        std::fs::write(&self.path, bytes).map_err(|source| UploadError::Io {
            path: self.path.clone(),
            source,
        })?;
        log::info!(
            "Stored upload '{}' ({} bytes) at {}",
            file_name,
            bytes.len(),
            self.path.display()
        );

        let records = ingest::parse_with(&self.path, &self.options)?;
        Ok(records.len())
    }
}

/// Whether `file_name` ends in an accepted spreadsheet extension
pub fn has_upload_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| UPLOAD_EXTENSIONS.iter().any(|allowed| ext.eq_ignore_ascii_case(allowed)))
        .unwrap_or(false)
}

/// Find a record by id, comparing the stringified id
pub fn find_by_id<'a>(records: &'a [Occurrence], id: &str) -> Option<&'a Occurrence> {
    records.iter().find(|r| r.id.as_deref() == Some(id))
}
