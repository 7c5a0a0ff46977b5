use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by Replay.
#[derive(Error, Debug)]
pub enum ReplayError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The given data path does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// No export files were found under the given directory.
    #[error("No streaming-history files found in {0}")]
    NoDataFiles(PathBuf),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the replay crates.
pub type Result<T> = std::result::Result<T, ReplayError>;
