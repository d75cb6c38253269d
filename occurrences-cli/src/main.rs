//! `occurrences`: normalize civil-protection occurrence spreadsheets.
//!
//! Spreadsheets from different organizations name their columns differently
//! and often start with title banners. The [`ingest`] engine finds the real
//! header row, maps columns onto a fixed six-field schema and coerces cell
//! values. The [`server`] exposes the latest upload over HTTP.

mod cli;
mod config;
mod ingest;
mod server;
mod services;

use anyhow::Result;
use clap::Parser;

use cli::commands::{header, records, serve};
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Parse(args) => records::handle_parse_command(args, &config),
        Commands::Metrics(args) => records::handle_metrics_command(args, &config),
        Commands::Header(args) => header::handle_header_command(args, &config),
        Commands::Serve(args) => serve::handle_serve_command(args, config).await,
    }
}

/// `RUST_LOG` wins; otherwise `-v` flags pick the level
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}
