mod handler;

pub use handler::handle_header_command;

use std::path::PathBuf;

use clap::Args;

#[derive(Args, Debug)]
pub struct HeaderCommand {
    /// Spreadsheet to inspect
    pub file: PathBuf,
}
