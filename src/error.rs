//! Errors raised while locating and parsing summary files.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while reading benchmark results. Every variant is fatal for the run.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// The results folder is missing or cannot be listed.
    #[error("failed to read folder {}: {source}", .path.display())]
    FolderRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A matching summary file could not be read.
    #[error("failed to read summary file {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A matching summary file is not valid JSON.
    #[error("failed to parse summary file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A matching summary file holds valid JSON that is not an object.
    #[error("summary file {} is not a JSON object (found {found})", .path.display())]
    NotAnObject { path: PathBuf, found: &'static str },
}
