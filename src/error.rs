use std::path::PathBuf;
use thiserror::Error;

/// The main error type for csvstage operations.
#[derive(Debug, Error)]
pub enum CsvstageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("download hub unavailable: {message}\nSet CSVSTAGE_CACHE (or HOME) to a writable directory and retry.")]
    HubUnavailable { message: String },

    #[error("invalid dataset reference '{input}': {message}")]
    DatasetRefInvalid { input: String, message: String },

    #[error("failed fetching dataset '{slug}': {message}")]
    FetchFailed { slug: String, message: String },

    #[error("invalid dataset archive at {path}: {message}")]
    ArchiveInvalid { path: PathBuf, message: String },

    #[error("failed staging files from {path}: {message}")]
    StageFailed { path: PathBuf, message: String },
}

impl CsvstageError {
    /// Process exit code for this error.
    ///
    /// A missing download hub is the only anticipated failure and exits
    /// with 1; everything else exits with 2.
    pub fn exit_code(&self) -> i32 {
        match self {
            CsvstageError::HubUnavailable { .. } => 1,
            _ => 2,
        }
    }
}
