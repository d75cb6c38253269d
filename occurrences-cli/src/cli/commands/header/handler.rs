//! Header detection diagnostics

use anyhow::{Context, Result};
use colored::*;

use super::HeaderCommand;
use crate::config::Config;
use crate::ingest::{self, CanonicalField};

pub fn handle_header_command(args: HeaderCommand, config: &Config) -> Result<()> {
    let options = config.ingest_options()?;
    let normalized = ingest::inspect(&args.file, &options)
        .with_context(|| format!("Failed to parse spreadsheet: {}", args.file.display()))?;

    println!("{}", "Header probes".bold());
    for probe in &normalized.probes {
        let marker = if probe.offset == normalized.header_row {
            "→".cyan().to_string()
        } else {
            " ".to_string()
        };
        match probe.score {
            Some(score) => println!("  {} row {:>2}  score {}", marker, probe.offset, score),
            None => println!("  {} row {:>2}  {}", marker, probe.offset, "skipped".dimmed()),
        }
    }

    println!();
    println!(
        "{} {}",
        "Header row:".bold(),
        normalized.header_row.to_string().bright_green().bold()
    );

    let labels: Vec<String> = normalized
        .labels
        .iter()
        .map(|label| {
            if label.is_named() {
                label.to_string()
            } else {
                label.to_string().dimmed().to_string()
            }
        })
        .collect();
    println!("{} {}", "Labels:".bold(), labels.join(", "));

    println!();
    println!("{}", "Column mapping".bold());
    for field in CanonicalField::ALL {
        match normalized.mapping.label(field) {
            Some(label) => println!("  {:<10} ← {}", field.as_str(), label.cyan()),
            None => println!(
                "  {:<10} {} {}",
                field.as_str(),
                "not found (always null), tried:".yellow(),
                options.aliases.aliases(field).join(", ").dimmed()
            ),
        }
    }

    println!();
    println!("{} {}", "Records:".bold(), normalized.records.len());

    Ok(())
}
