mod handler;

pub use handler::handle_serve_command;

use std::path::PathBuf;

use clap::Args;

#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to listen on [default: 127.0.0.1:8000]
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Directory for the uploaded spreadsheet [default: ./data]
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}
