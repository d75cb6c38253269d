//! Command-line interface definitions

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "occurrences",
    about = "Normalize civil-protection occurrence spreadsheets",
    version
)]
pub struct Cli {
    /// Config file [default: ./occurrences.toml, fallback <config dir>/occurrences/config.toml]
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a spreadsheet and print the normalized records
    Parse(commands::records::ParseCommand),
    /// Print counts by severity and status for a spreadsheet
    Metrics(commands::records::MetricsCommand),
    /// Show how the header row and columns were detected
    Header(commands::header::HeaderCommand),
    /// Run the HTTP API
    Serve(commands::serve::ServeCommand),
}

/// Output format for record and metrics commands
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}
