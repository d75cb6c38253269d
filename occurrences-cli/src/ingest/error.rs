use std::path::PathBuf;

use thiserror::Error;

use super::workbook::SourceFormat;

/// Failures that abort a parse. Cell-level problems never surface here.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("file does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("file is empty (did the upload fail?): {}", .0.display())]
    Empty(PathBuf),

    #[error("failed to read spreadsheet {} as {format}: {message}", .path.display())]
    Decode {
        path: PathBuf,
        format: SourceFormat,
        message: String,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    /// Short machine-friendly name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            ParseError::NotFound(_) => "not_found",
            ParseError::Empty(_) => "empty",
            ParseError::Decode { .. } => "decode_error",
            ParseError::Io { .. } => "io_error",
        }
    }
}
