//! Aggregate counts over normalized occurrences

use std::collections::BTreeMap;

use serde::Serialize;

use crate::ingest::Occurrence;

const UNKNOWN: &str = "unknown";

/// Occurrence counts grouped by severity and by status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub total: usize,
    /// Keyed by lower-cased severity
    pub by_severity: BTreeMap<String, usize>,
    /// Keyed by the raw status text
    pub by_status: BTreeMap<String, usize>,
}

impl Metrics {
    pub fn from_records(records: &[Occurrence]) -> Self {
        let mut metrics = Metrics {
            total: records.len(),
            ..Default::default()
        };

        for record in records {
            let severity = record.severity.as_deref().unwrap_or(UNKNOWN).to_lowercase();
            let status = record.status.as_deref().unwrap_or(UNKNOWN).to_string();

            *metrics.by_severity.entry(severity).or_insert(0) += 1;
            *metrics.by_status.entry(status).or_insert(0) += 1;
        }

        metrics
    }
}
