//! Spreadsheet decoding
//!
//! Picks a calamine reader from the file extension and content, then loads
//! the first worksheet into a [`Sheet`] grid addressed from cell A1.

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Range, Reader, Xls, Xlsb, Xlsx, open_workbook_auto_from_rs};

/// Local file header signature that opens every zip container
const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";

static EMPTY_CELL: Data = Data::Empty;

/// Decode strategy for a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Office Open XML (zip container)
    Xlsx,
    /// Legacy BIFF binary workbook
    Xls,
    /// Binary-packed workbook (zip container)
    Xlsb,
    /// Let calamine try every reader it knows
    Auto,
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::Xlsx => write!(f, "xlsx"),
            SourceFormat::Xls => write!(f, "xls"),
            SourceFormat::Xlsb => write!(f, "xlsb"),
            SourceFormat::Auto => write!(f, "auto-detected workbook"),
        }
    }
}

/// Choose a decoder from the file extension and its leading bytes.
///
/// Files named `.xlsx`/`.xlsm`/`.xltx` that are not zip containers are old
/// BIFF workbooks saved under the wrong extension.
pub fn detect_format(path: &Path, bytes: &[u8]) -> SourceFormat {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xltx" => {
            if is_zip_container(bytes) {
                SourceFormat::Xlsx
            } else {
                SourceFormat::Xls
            }
        }
        "xls" => SourceFormat::Xls,
        "xlsb" => SourceFormat::Xlsb,
        _ => SourceFormat::Auto,
    }
}

pub fn is_zip_container(bytes: &[u8]) -> bool {
    bytes.starts_with(ZIP_SIGNATURE)
}

/// Decode the first worksheet of a workbook held in memory
pub fn decode_first_sheet(bytes: Vec<u8>, format: SourceFormat) -> Result<Sheet, String> {
    let range = match format {
        SourceFormat::Xlsx => first_range::<Xlsx<_>>(bytes)?,
        SourceFormat::Xls => first_range::<Xls<_>>(bytes)?,
        SourceFormat::Xlsb => first_range::<Xlsb<_>>(bytes)?,
        SourceFormat::Auto => {
            let mut workbook =
                open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| e.to_string())?;
            workbook
                .worksheet_range_at(0)
                .ok_or_else(|| "workbook has no sheets".to_string())?
                .map_err(|e| e.to_string())?
        }
    };

    Ok(Sheet::from_range(&range))
}

fn first_range<R>(bytes: Vec<u8>) -> Result<Range<Data>, String>
where
    R: Reader<Cursor<Vec<u8>>>,
    R::Error: std::fmt::Display,
{
    let mut workbook = R::new(Cursor::new(bytes)).map_err(|e| e.to_string())?;
    workbook
        .worksheet_range_at(0)
        .ok_or_else(|| "workbook has no sheets".to_string())?
        .map_err(|e| e.to_string())
}

/// Rectangular, fully materialized worksheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    rows: Vec<Vec<Data>>,
    width: usize,
}

impl Sheet {
    /// Build a sheet from rows of cells; short rows read as empty cells
    pub fn from_rows(rows: Vec<Vec<Data>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self { rows, width }
    }

    /// Convert a calamine range, restoring the empty rows and columns that
    /// precede its first used cell.
    pub fn from_range(range: &Range<Data>) -> Self {
        let Some((start_row, start_col)) = range.start() else {
            return Self::default();
        };

        let mut rows: Vec<Vec<Data>> = (0..start_row).map(|_| Vec::new()).collect();
        for row in range.rows() {
            let mut padded = vec![Data::Empty; start_col as usize];
            padded.extend(row.iter().cloned());
            rows.push(padded);
        }

        Self::from_rows(rows)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Cell at (row, col); anything outside the used area is empty
    pub fn cell(&self, row: usize, col: usize) -> &Data {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn row(&self, row: usize) -> Option<&[Data]> {
        self.rows.get(row).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_detect_format_by_extension() {
        let zip = b"PK\x03\x04rest-of-archive";
        let biff = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

        assert_eq!(detect_format(&PathBuf::from("a.xlsx"), zip), SourceFormat::Xlsx);
        assert_eq!(detect_format(&PathBuf::from("a.XLSM"), zip), SourceFormat::Xlsx);
        assert_eq!(detect_format(&PathBuf::from("a.xltx"), zip), SourceFormat::Xlsx);
        assert_eq!(detect_format(&PathBuf::from("a.xls"), biff), SourceFormat::Xls);
        assert_eq!(detect_format(&PathBuf::from("a.xlsb"), zip), SourceFormat::Xlsb);
        assert_eq!(detect_format(&PathBuf::from("a.ods"), zip), SourceFormat::Auto);
        assert_eq!(detect_format(&PathBuf::from("noext"), zip), SourceFormat::Auto);
    }

    #[test]
    fn test_xlsx_without_zip_signature_falls_back_to_xls() {
        let biff = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";
        assert_eq!(detect_format(&PathBuf::from("old.xlsx"), biff), SourceFormat::Xls);
        assert_eq!(detect_format(&PathBuf::from("old.xlsx"), b"PK"), SourceFormat::Xls);
    }

    #[test]
    fn test_cell_outside_used_area_is_empty() {
        let sheet = Sheet::from_rows(vec![
            vec![Data::String("a".into())],
            vec![Data::String("b".into()), Data::Int(2)],
        ]);
        assert_eq!(sheet.width(), 2);
        assert_eq!(sheet.height(), 2);
        assert_eq!(sheet.cell(0, 1), &Data::Empty);
        assert_eq!(sheet.cell(9, 9), &Data::Empty);
        assert_eq!(sheet.cell(1, 1), &Data::Int(2));
    }

    #[test]
    fn test_decode_garbage_reports_error() {
        let result = decode_first_sheet(b"not a workbook".to_vec(), SourceFormat::Xls);
        assert!(result.is_err());
    }
}
