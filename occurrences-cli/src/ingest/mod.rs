//! Spreadsheet normalization engine
//!
//! Reads an occurrence spreadsheet, finds the real header row, maps its
//! columns onto the canonical schema and coerces every data row into an
//! [`Occurrence`].
//!
//! Parsing is synchronous and stateless: each call reads the file from disk
//! and returns fully materialized records.

pub mod coerce;
pub mod columns;
pub mod error;
pub mod header;
pub mod model;
pub mod workbook;

use std::path::Path;

pub use columns::{AliasTable, ColumnMapping, map_columns};
pub use error::ParseError;
pub use header::{DEFAULT_HEADER_KEYWORDS, DEFAULT_MAX_HEADER_ROWS, HeaderLabel, HeaderProbe};
pub use model::{CanonicalField, Occurrence, Severity};
pub use workbook::{Sheet, SourceFormat};

use coerce::{coerce, is_blank};

/// Knobs for header detection and column mapping
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Number of leading rows probed as header candidates
    pub max_header_rows: usize,
    /// Substrings that mark a row as a likely header
    pub header_keywords: Vec<String>,
    pub aliases: AliasTable,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            max_header_rows: DEFAULT_MAX_HEADER_ROWS,
            header_keywords: DEFAULT_HEADER_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            aliases: AliasTable::default(),
        }
    }
}

/// Result of normalizing one worksheet
#[derive(Debug, Clone)]
pub struct NormalizedSheet {
    /// Zero-based row used as the header
    pub header_row: usize,
    pub probes: Vec<HeaderProbe>,
    pub labels: Vec<HeaderLabel>,
    pub mapping: ColumnMapping,
    pub records: Vec<Occurrence>,
}

/// Parse a spreadsheet with default options
pub fn parse<P: AsRef<Path>>(path: P) -> Result<Vec<Occurrence>, ParseError> {
    parse_with(path, &IngestOptions::default())
}

/// Parse a spreadsheet into canonical occurrence records
pub fn parse_with<P: AsRef<Path>>(
    path: P,
    options: &IngestOptions,
) -> Result<Vec<Occurrence>, ParseError> {
    inspect(path, options).map(|normalized| normalized.records)
}

/// Parse a spreadsheet and keep the intermediate header/mapping decisions
pub fn inspect<P: AsRef<Path>>(
    path: P,
    options: &IngestOptions,
) -> Result<NormalizedSheet, ParseError> {
    let path = path.as_ref();
    let sheet = load_sheet(path)?;
    let normalized = normalize_sheet(&sheet, options);

    log::info!(
        "Parsed {}: header row {}, {} of 6 fields mapped, {} records",
        path.display(),
        normalized.header_row,
        normalized.mapping.len(),
        normalized.records.len()
    );

    Ok(normalized)
}

/// Read and decode the first worksheet of `path`
pub fn load_sheet(path: &Path) -> Result<Sheet, ParseError> {
    if !path.exists() {
        return Err(ParseError::NotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.is_empty() {
        return Err(ParseError::Empty(path.to_path_buf()));
    }

    let format = workbook::detect_format(path, &bytes);
    log::debug!("Decoding {} as {}", path.display(), format);

    workbook::decode_first_sheet(bytes, format).map_err(|message| ParseError::Decode {
        path: path.to_path_buf(),
        format,
        message,
    })
}

/// Locate the header, map columns and build one record per data row.
///
/// Data rows are the rows below the header holding at least one non-blank
/// cell.
pub fn normalize_sheet(sheet: &Sheet, options: &IngestOptions) -> NormalizedSheet {
    let (header_row, probes) = header::locate_header_row(
        sheet,
        options.max_header_rows,
        options.header_keywords.as_slice(),
    );

    let labels = header::header_labels(sheet, header_row).unwrap_or_default();
    let mapping = map_columns(&labels, &options.aliases);
    if mapping.is_empty() {
        log::warn!("No column in header row {} matches a known field", header_row);
    }

    let records = (header_row + 1..sheet.height())
        .filter(|&row| sheet.row(row).is_some_and(|cells| !cells.iter().all(is_blank)))
        .map(|row| build_record(sheet, row, &mapping))
        .collect();

    NormalizedSheet {
        header_row,
        probes,
        labels,
        mapping,
        records,
    }
}

fn build_record(sheet: &Sheet, row: usize, mapping: &ColumnMapping) -> Occurrence {
    let mut occurrence = Occurrence::default();
    for field in CanonicalField::ALL {
        let value = mapping
            .get(field)
            .and_then(|column| coerce(field, sheet.cell(row, column.index)));
        occurrence.set(field, value);
    }
    occurrence
}
