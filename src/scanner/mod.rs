//! Summary file discovery.
//!
//! This module lists result folders and picks out the benchmark summary
//! files that the aggregator reads.

use crate::error::SummaryError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration for file scanning.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// File name suffix of summary files (e.g. "_summary.json")
    pub suffix: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            suffix: "_summary.json".to_string(),
        }
    }
}

impl From<&crate::config::ScannerConfig> for ScanConfig {
    fn from(config: &crate::config::ScannerConfig) -> Self {
        Self {
            suffix: config.suffix.clone(),
        }
    }
}

/// A summary file found in a result folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryFile {
    /// Full path to the file.
    pub path: PathBuf,
    /// File name only.
    pub file_name: String,
}

/// Locates summary files in result folders under a base directory.
pub struct SummaryScanner {
    config: ScanConfig,
    base_dir: PathBuf,
}

impl SummaryScanner {
    /// Create a new scanner rooted at `base_dir`.
    pub fn new(base_dir: PathBuf, config: ScanConfig) -> Self {
        Self { config, base_dir }
    }

    /// Path of a result folder.
    pub fn folder_path(&self, folder_name: &str) -> PathBuf {
        self.base_dir.join(folder_name)
    }

    /// List the summary files directly inside a result folder.
    ///
    /// Subdirectories are not descended into. Files are returned sorted by
    /// name. A folder that is missing or unreadable is an error.
    pub fn locate(&self, folder_name: &str) -> Result<Vec<SummaryFile>, SummaryError> {
        let dir_path = self.folder_path(folder_name);

        let entries = fs::read_dir(&dir_path).map_err(|source| SummaryError::FolderRead {
            path: dir_path.clone(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| SummaryError::FolderRead {
                path: dir_path.clone(),
                source,
            })?;

            let name = entry.file_name().to_string_lossy().to_string();
            if !self.matches(&name) {
                continue;
            }

            let path = entry.path();
            if !path.is_file() {
                debug!("Skipping non-file entry {}", path.display());
                continue;
            }

            files.push(SummaryFile {
                path,
                file_name: name,
            });
        }

        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        debug!(
            "Found {} summary files in {}",
            files.len(),
            dir_path.display()
        );
        Ok(files)
    }

    /// Check if a file name looks like a summary file.
    pub fn matches(&self, name: &str) -> bool {
        name.ends_with(&self.config.suffix)
    }

    /// Base directory the folders are resolved against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}
