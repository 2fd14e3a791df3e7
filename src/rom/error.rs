// Error types for extraction and sorting

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Failure to turn one input into ROM files. Never fatal to a batch.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("7-Zip not found; install it, add it to PATH, or extract {} manually", .input.display())]
    MissingTool { input: PathBuf },

    #[error("decompression tool failed on {} ({status})", .input.display())]
    ToolFailed { input: PathBuf, status: ExitStatus },

    #[error("invalid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure that aborts a whole batch.
#[derive(Error, Debug)]
pub enum SortError {
    #[error("cannot create destination folder {}: {source}", .path.display())]
    Destination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create scratch directory: {0}")]
    Scratch(#[source] std::io::Error),
}
