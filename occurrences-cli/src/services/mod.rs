//! Occurrence services backing the HTTP boundary and the CLI
//!
//! The store owns the single uploaded spreadsheet and re-parses it on every
//! read; metrics are computed from whatever the store returns.

pub mod metrics;
pub mod store;

pub use metrics::Metrics;
pub use store::{OccurrenceStore, UploadError, find_by_id};
