//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// llmperf-summary - merge llmperf benchmark summaries into one table
///
/// Reads every `*_summary.json` file in the given result folders, extracts
/// token counts, concurrency and latency metrics (ITL converted to ms),
/// and writes one sorted `<folders>_summary_results.csv`.
///
/// Examples:
///   llmperf-summary
///   llmperf-summary unifiedcache nocache baseline
///   llmperf-summary --base-dir ./test/results --format json
///   llmperf-summary --dry-run
///   llmperf-summary --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Result folders to aggregate, relative to the base directory
    ///
    /// Defaults to the folders from the config file, or `recaculation`.
    #[arg(value_name = "FOLDER")]
    pub folders: Vec<String>,

    /// Directory containing the result folders
    ///
    /// Defaults to the current directory.
    #[arg(short, long, value_name = "DIR", env = "LLMPERF_SUMMARY_DIR")]
    pub base_dir: Option<PathBuf>,

    /// Directory to write the report into
    ///
    /// Defaults to the base directory.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format (csv, json)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// File name suffix identifying summary files
    #[arg(long, value_name = "SUFFIX")]
    pub suffix: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .llmperf-summary.toml in the base directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: list matching summary files without writing a report
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .llmperf-summary.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Comma-separated values (default)
    #[default]
    Csv,
    /// JSON document with metadata
    Json,
}

impl OutputFormat {
    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The base directory, falling back to the current directory.
    pub fn base_dir(&self) -> PathBuf {
        self.base_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// The output directory, falling back to the base directory.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| self.base_dir())
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        for folder in &self.folders {
            validate_folder_name(folder)?;
        }

        if let Some(ref suffix) = self.suffix {
            if suffix.is_empty() {
                return Err("Suffix must not be empty".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        let base_dir = self.base_dir();
        if !base_dir.exists() {
            return Err(format!(
                "Base directory does not exist: {}",
                base_dir.display()
            ));
        }
        if !base_dir.is_dir() {
            return Err(format!(
                "Base path is not a directory: {}",
                base_dir.display()
            ));
        }

        if let Some(ref output_dir) = self.output_dir {
            if output_dir.exists() && !output_dir.is_dir() {
                return Err(format!(
                    "Output path is not a directory: {}",
                    output_dir.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `--quiet` wins over a verbose config file.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

/// Folder names must be a single plain path component.
pub fn validate_folder_name(folder: &str) -> Result<(), String> {
    if folder.is_empty() {
        return Err("Folder name must not be empty".to_string());
    }
    if folder == "." || folder == ".." || Path::new(folder).components().count() != 1 {
        return Err(format!(
            "Folder name must be a single directory name: {}",
            folder
        ));
    }
    Ok(())
}
