//! Cell value coercion into canonical field values
//!
//! Coercion never fails: values that cannot be interpreted degrade to their
//! text, and blank cells become `None`.

use calamine::{CellErrorType, Data};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeDelta, Timelike};

use super::model::{CanonicalField, Severity};

/// Severity synonyms, keyed by lower-cased text
const SEVERITY_SYNONYMS: [(&str, Severity); 12] = [
    ("critico", Severity::Critical),
    ("crítico", Severity::Critical),
    ("critical", Severity::Critical),
    ("alta", Severity::High),
    ("alto", Severity::High),
    ("high", Severity::High),
    ("medio", Severity::Medium),
    ("médio", Severity::Medium),
    ("medium", Severity::Medium),
    ("baixa", Severity::Low),
    ("baixo", Severity::Low),
    ("low", Severity::Low),
];

/// Excel's day zero in the 1900 date system (accounts for the 1900 leap bug)
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Serial for 9999-12-31, the last date Excel can represent
const MAX_EXCEL_SERIAL: f64 = 2_958_466.0;

/// Text values read as missing, compared exactly (no trimming or case folding)
const MISSING_VALUE_MARKERS: &[&str] = &[
    "",
    "#N/A",
    "#N/A N/A",
    "#NA",
    "-1.#IND",
    "-1.#QNAN",
    "-NaN",
    "-nan",
    "1.#IND",
    "1.#QNAN",
    "<NA>",
    "N/A",
    "NA",
    "NULL",
    "NaN",
    "None",
    "n/a",
    "nan",
    "null",
];

const DATETIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
];

const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

/// Coerce a cell into the value for `field`
pub fn coerce(field: CanonicalField, cell: &Data) -> Option<String> {
    match field {
        CanonicalField::Severity => normalize_severity(cell),
        CanonicalField::Timestamp => normalize_timestamp(cell),
        CanonicalField::Id
        | CanonicalField::Type
        | CanonicalField::Location
        | CanonicalField::Status => cell_text(cell),
    }
}

/// Whether a cell reads as missing: empty cells, `#N/A` errors, NaN floats
/// and the text markers in [`MISSING_VALUE_MARKERS`]
pub fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::Error(CellErrorType::NA) => true,
        Data::String(s) => MISSING_VALUE_MARKERS.contains(&s.as_str()),
        Data::Float(f) => f.is_nan(),
        _ => false,
    }
}

/// Textual form of a cell, verbatim. `None` for blank cells.
pub fn cell_text(cell: &Data) -> Option<String> {
    if is_blank(cell) {
        return None;
    }
    render_cell(cell)
}

/// Textual form of a cell without the missing-marker check. Header labels
/// use this so a column titled `NA` keeps its name.
pub fn render_cell(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty => return None,
        Data::Float(f) if f.is_nan() => return None,
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_float(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) if dt.is_datetime() => ndt.format("%Y-%m-%d %H:%M:%S").to_string(),
            _ => format_float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(err) => err.to_string(),
    };

    Some(text)
}

/// Whole numbers print without a fractional part
fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        (f as i64).to_string()
    } else {
        f.to_string()
    }
}

/// Look up a severity synonym (case- and accent-insensitive)
pub fn lookup_severity(text: &str) -> Option<Severity> {
    let key = text.trim().to_lowercase();
    find_synonym(&key).or_else(|| find_synonym(&fold_diacritics(&key)))
}

fn find_synonym(key: &str) -> Option<Severity> {
    SEVERITY_SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == key)
        .map(|(_, severity)| *severity)
}

/// Normalize a severity cell.
///
/// Known synonyms map to `critical`/`high`/`medium`/`low`; anything else is
/// passed through trimmed and lower-cased.
pub fn normalize_severity(cell: &Data) -> Option<String> {
    let text = cell_text(cell)?;
    let key = text.trim().to_lowercase();

    match lookup_severity(&key) {
        Some(severity) => Some(severity.as_str().to_string()),
        None => Some(key),
    }
}

fn fold_diacritics(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Normalize a timestamp cell to ISO-8601.
///
/// Tries, in order: native date cells, Excel serials and common textual
/// layouts; strict ISO-8601 on the text form; the text form itself.
///
/// Slash and dash dates are read day-first, so `01/03/2024` is 1 March.
/// This deliberately departs from month-first readers such as pandas'
/// `to_datetime`; the sources are Portuguese exports.
pub fn normalize_timestamp(cell: &Data) -> Option<String> {
    let raw = cell_text(cell)?;

    let iso = parse_datetime_cell(cell).or_else(|| parse_strict_iso(&raw));
    Some(iso.unwrap_or(raw))
}

fn parse_datetime_cell(cell: &Data) -> Option<String> {
    match cell {
        Data::DateTime(dt) if dt.is_datetime() => dt.as_datetime().map(render_naive),
        Data::DateTimeIso(s) => parse_datetime_text(s),
        Data::Float(f) => excel_serial_to_datetime(*f).map(render_naive),
        Data::Int(i) => excel_serial_to_datetime(*i as f64).map(render_naive),
        Data::String(s) => parse_datetime_text(s),
        _ => None,
    }
}

fn parse_datetime_text(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.to_rfc3339_opts(SecondsFormat::AutoSi, false));
    }

    if let Some(ndt) = DATETIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(s, layout).ok())
    {
        return Some(render_naive(ndt));
    }

    DATE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(s, layout).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(render_naive)
}

fn parse_strict_iso(s: &str) -> Option<String> {
    if let Ok(dt) = s.parse::<DateTime<chrono::FixedOffset>>() {
        return Some(dt.to_rfc3339_opts(SecondsFormat::AutoSi, false));
    }
    if let Ok(ndt) = s.parse::<NaiveDateTime>() {
        return Some(render_naive(ndt));
    }
    s.parse::<NaiveDate>()
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(render_naive)
}

/// Convert an Excel serial day number (1900 date system) to a date/time
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial <= 0.0 || serial >= MAX_EXCEL_SERIAL {
        return None;
    }

    let (y, m, d) = EXCEL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(TimeDelta::try_milliseconds(millis)?)
}

fn render_naive(ndt: NaiveDateTime) -> String {
    if ndt.nanosecond() == 0 {
        ndt.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        ndt.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}
