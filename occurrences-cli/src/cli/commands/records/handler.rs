//! Parse and metrics command handlers

use anyhow::{Context, Result};
use colored::*;

use super::{MetricsCommand, ParseCommand};
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::ingest::{self, CanonicalField, Occurrence};
use crate::services::Metrics;

/// Longest cell printed in table output
const MAX_CELL_WIDTH: usize = 32;

pub fn handle_parse_command(args: ParseCommand, config: &Config) -> Result<()> {
    let records = load(&args.file, config)?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Table => print_records(&records),
    }

    Ok(())
}

pub fn handle_metrics_command(args: MetricsCommand, config: &Config) -> Result<()> {
    let records = load(&args.file, config)?;
    let metrics = Metrics::from_records(&records);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&metrics)?),
        OutputFormat::Table => print_metrics(&metrics),
    }

    Ok(())
}

fn load(file: &std::path::Path, config: &Config) -> Result<Vec<Occurrence>> {
    let options = config.ingest_options()?;
    ingest::parse_with(file, &options)
        .with_context(|| format!("Failed to parse spreadsheet: {}", file.display()))
}

fn print_records(records: &[Occurrence]) {
    if records.is_empty() {
        println!("{}", "No occurrences found".yellow());
        return;
    }

    let widths: Vec<usize> = CanonicalField::ALL
        .iter()
        .map(|field| {
            records
                .iter()
                .map(|r| r.get(*field).map_or(1, |v| v.chars().count()))
                .max()
                .unwrap_or(0)
                .max(field.as_str().len())
                .min(MAX_CELL_WIDTH)
        })
        .collect();

    let header: Vec<String> = CanonicalField::ALL
        .iter()
        .zip(&widths)
        .map(|(field, width)| format!("{:<width$}", field.as_str(), width = width))
        .collect();
    println!("{}", header.join("  ").bold());

    for record in records {
        let cells: Vec<String> = CanonicalField::ALL
            .iter()
            .zip(&widths)
            .map(|(field, width)| render_cell(*field, record.get(*field), *width))
            .collect();
        println!("{}", cells.join("  "));
    }

    println!();
    println!("{} occurrences", records.len().to_string().bright_green().bold());
}

fn render_cell(field: CanonicalField, value: Option<&str>, width: usize) -> String {
    let Some(value) = value else {
        return format!("{:<width$}", "-", width = width).dimmed().to_string();
    };

    let padded = format!("{:<width$}", truncate(value, width), width = width);
    if field != CanonicalField::Severity {
        return padded;
    }

    match ingest::coerce::lookup_severity(value) {
        Some(ingest::Severity::Critical) => padded.red().bold().to_string(),
        Some(ingest::Severity::High) => padded.red().to_string(),
        Some(ingest::Severity::Medium) => padded.yellow().to_string(),
        Some(ingest::Severity::Low) => padded.green().to_string(),
        None => padded,
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn print_metrics(metrics: &Metrics) {
    println!("{} {}", "Total:".bold(), metrics.total.to_string().bright_green().bold());

    println!();
    println!("{}", "By severity".bold());
    for (severity, count) in &metrics.by_severity {
        println!("  {:<20} {}", severity, count);
    }

    println!();
    println!("{}", "By status".bold());
    for (status, count) in &metrics.by_status {
        println!("  {:<20} {}", status, count);
    }
}
