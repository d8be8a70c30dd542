//! Error types for add-events.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can stop an add-events run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read calendar config from {}", .path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid calendar config: {0}")]
    ParseConfig(#[from] serde_yaml::Error),

    #[error("Calendar rejected \"{title}\": {reason}")]
    Rejected { title: String, reason: String },

    #[error("Failed to write progress report: {0}")]
    Report(#[from] std::io::Error),
}

/// Result type alias for add-events operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
