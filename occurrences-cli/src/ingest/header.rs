//! Header row detection
//!
//! Spreadsheets exported by hand often start with title banners or blank
//! rows. Each candidate row is scored as if it were the header; the best
//! scoring row wins, earliest row on ties.

use std::collections::HashMap;

use super::coerce::render_cell;
use super::workbook::Sheet;

/// Number of leading rows probed by default
pub const DEFAULT_MAX_HEADER_ROWS: usize = 10;

/// Substrings that identify a genuine header label
pub const DEFAULT_HEADER_KEYWORDS: &[&str] = &[
    "estado",
    "local",
    "data de alerta",
    "tipo",
    "ocorrência n",
    "descrição",
    "impacto",
];

/// A column label derived from a candidate header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderLabel {
    /// Real header text (suffixed with `.N` when repeated)
    Named(String),
    /// Positional filler for a blank header cell
    Placeholder(usize),
}

impl HeaderLabel {
    pub fn is_named(&self) -> bool {
        matches!(self, HeaderLabel::Named(_))
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            HeaderLabel::Named(name) => Some(name),
            HeaderLabel::Placeholder(_) => None,
        }
    }
}

impl std::fmt::Display for HeaderLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeaderLabel::Named(name) => write!(f, "{}", name),
            HeaderLabel::Placeholder(col) => write!(f, "Unnamed: {}", col),
        }
    }
}

/// Score of one candidate header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderProbe {
    pub offset: usize,
    /// `None` when the row could not be read as a header
    pub score: Option<usize>,
}

/// Column labels obtained by treating `row` as the header.
///
/// Returns `None` when `row` lies past the end of the sheet.
pub fn header_labels(sheet: &Sheet, row: usize) -> Option<Vec<HeaderLabel>> {
    let cells = sheet.row(row)?;
    let mut seen: HashMap<String, usize> = HashMap::new();

    let labels = (0..sheet.width())
        .map(|col| {
            let text = cells.get(col).and_then(render_cell);
            match text {
                Some(text) if !text.trim().is_empty() => {
                    let count = seen.entry(text.clone()).or_insert(0);
                    let label = if *count == 0 {
                        text
                    } else {
                        format!("{}.{}", text, count)
                    };
                    *count += 1;
                    HeaderLabel::Named(label)
                }
                _ => HeaderLabel::Placeholder(col),
            }
        })
        .collect();

    Some(labels)
}

/// Score a set of labels: named columns plus double weight per keyword hit
pub fn score_labels<S: AsRef<str>>(labels: &[HeaderLabel], keywords: &[S]) -> usize {
    let named: Vec<String> = labels
        .iter()
        .filter_map(HeaderLabel::name)
        .map(str::to_lowercase)
        .collect();

    let matches = named
        .iter()
        .map(|label| {
            keywords
                .iter()
                .filter(|kw| {
                    let kw: &str = (*kw).as_ref();
                    label.contains(&kw.to_lowercase())
                })
                .count()
        })
        .sum::<usize>();

    named.len() + 2 * matches
}

/// Score row `row` as a header candidate
pub fn score_offset<S: AsRef<str>>(sheet: &Sheet, row: usize, keywords: &[S]) -> Option<usize> {
    header_labels(sheet, row).map(|labels| score_labels(&labels, keywords))
}

/// Score every candidate row in `[0, max_rows)`
pub fn probe_header_rows<S: AsRef<str>>(
    sheet: &Sheet,
    max_rows: usize,
    keywords: &[S],
) -> Vec<HeaderProbe> {
    (0..max_rows)
        .map(|offset| {
            let score = score_offset(sheet, offset, keywords);
            match score {
                Some(score) => log::debug!("Header probe row {}: score {}", offset, score),
                None => log::debug!("Header probe row {}: skipped, past end of sheet", offset),
            }
            HeaderProbe { offset, score }
        })
        .collect()
}

/// Pick the best header row among probes.
///
/// Only a strictly higher score replaces the current best, so ties keep the
/// earliest row. Without any positive score the header is row 0.
pub fn best_header_row(probes: &[HeaderProbe]) -> usize {
    probes
        .iter()
        .filter_map(|probe| probe.score.map(|score| (probe.offset, score)))
        .fold((0, 0), |best, candidate| {
            if candidate.1 > best.1 { candidate } else { best }
        })
        .0
}

/// Find the header row of `sheet`, probing at most `max_rows` rows.
///
/// The probes are returned alongside the chosen row for diagnostics.
pub fn locate_header_row<S: AsRef<str>>(
    sheet: &Sheet,
    max_rows: usize,
    keywords: &[S],
) -> (usize, Vec<HeaderProbe>) {
    let probes = probe_header_rows(sheet, max_rows, keywords);
    (best_header_row(&probes), probes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::Data;

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    fn scenario_sheet() -> Sheet {
        Sheet::from_rows(vec![
            vec![s("Relatório de Ocorrências - Proteção Civil")],
            vec![],
            vec![s("Ocorrência N.º"), s("Estado"), s("Local"), s("Data de Alerta"), s("Tipo")],
            vec![s("1"), s("Em Curso"), s("Porto"), s("2024-01-05 10:00"), s("Incêndio")],
            vec![s("2"), s("Encerrada"), s("Braga"), s("2024-01-06 11:00"), s("Cheia")],
        ])
    }

    #[test]
    fn test_banner_and_blank_rows_are_skipped() {
        let sheet = scenario_sheet();
        let (row, probes) = locate_header_row(&sheet, DEFAULT_MAX_HEADER_ROWS, DEFAULT_HEADER_KEYWORDS);
        assert_eq!(row, 2);
        assert_eq!(probes.len(), DEFAULT_MAX_HEADER_ROWS);
    }

    #[test]
    fn test_blank_header_cells_become_placeholders() {
        let sheet = Sheet::from_rows(vec![vec![s("Estado"), Data::Empty, s("  "), s("Local")]]);
        let labels = header_labels(&sheet, 0).unwrap();
        assert_eq!(
            labels,
            vec![
                HeaderLabel::Named("Estado".into()),
                HeaderLabel::Placeholder(1),
                HeaderLabel::Placeholder(2),
                HeaderLabel::Named("Local".into()),
            ]
        );
        assert_eq!(labels[1].to_string(), "Unnamed: 1");
    }

    #[test]
    fn test_repeated_labels_are_suffixed() {
        let sheet = Sheet::from_rows(vec![vec![s("Local"), s("Local"), s("Local")]]);
        let labels = header_labels(&sheet, 0).unwrap();
        let names: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        assert_eq!(names, vec!["Local", "Local.1", "Local.2"]);
    }

    #[test]
    fn test_score_counts_named_and_keyword_hits() {
        let labels = vec![
            HeaderLabel::Named("Estado".into()),
            HeaderLabel::Named("Observações".into()),
            HeaderLabel::Placeholder(2),
        ];
        // 2 named + 2 * 1 keyword hit
        assert_eq!(score_labels(&labels, DEFAULT_HEADER_KEYWORDS), 4);
    }

    #[test]
    fn test_one_label_can_hit_several_keywords() {
        // "local" and "tipo" are both substrings
        let labels = vec![HeaderLabel::Named("Tipo de Local".into())];
        assert_eq!(score_labels(&labels, DEFAULT_HEADER_KEYWORDS), 1 + 2 * 2);
    }

    #[test]
    fn test_score_grows_with_keywords_at_fixed_named_count() {
        let plain = vec![HeaderLabel::Named("A".into()), HeaderLabel::Named("B".into())];
        let one = vec![HeaderLabel::Named("Estado".into()), HeaderLabel::Named("B".into())];
        let two = vec![HeaderLabel::Named("Estado".into()), HeaderLabel::Named("Impacto".into())];
        let kw = DEFAULT_HEADER_KEYWORDS;
        assert!(score_labels(&plain, kw) <= score_labels(&one, kw));
        assert!(score_labels(&one, kw) <= score_labels(&two, kw));
    }

    #[test]
    fn test_all_zero_scores_default_to_row_zero() {
        let sheet = Sheet::from_rows(vec![vec![], vec![], vec![]]);
        assert_eq!(locate_header_row(&sheet, 10, DEFAULT_HEADER_KEYWORDS).0, 0);
        assert_eq!(locate_header_row(&Sheet::default(), 10, DEFAULT_HEADER_KEYWORDS).0, 0);
    }

    #[test]
    fn test_ties_keep_earliest_row() {
        let probes = vec![
            HeaderProbe { offset: 0, score: Some(1) },
            HeaderProbe { offset: 1, score: Some(5) },
            HeaderProbe { offset: 2, score: None },
            HeaderProbe { offset: 3, score: Some(5) },
        ];
        assert_eq!(best_header_row(&probes), 1);
    }

    #[test]
    fn test_missing_value_text_still_names_a_header_column() {
        let sheet = Sheet::from_rows(vec![vec![s("Estado"), s("NA")]]);
        let labels = header_labels(&sheet, 0).unwrap();
        assert_eq!(labels[1], HeaderLabel::Named("NA".into()));
    }

    #[test]
    fn test_rows_past_the_end_are_skipped() {
        let sheet = scenario_sheet();
        let probes = probe_header_rows(&sheet, 10, DEFAULT_HEADER_KEYWORDS);
        assert_eq!(probes.len(), 10);
        assert!(probes[4].score.is_some());
        assert!(probes[5..].iter().all(|p| p.score.is_none()));
    }
}
