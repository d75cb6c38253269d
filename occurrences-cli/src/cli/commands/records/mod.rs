mod handler;

pub use handler::{handle_metrics_command, handle_parse_command};

use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;

#[derive(Args, Debug)]
pub struct ParseCommand {
    /// Spreadsheet to parse (.xlsx, .xlsm, .xltx, .xls, .xlsb, .ods)
    pub file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "table", value_name = "FORMAT")]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct MetricsCommand {
    /// Spreadsheet to summarize
    pub file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "table", value_name = "FORMAT")]
    pub format: OutputFormat,
}
