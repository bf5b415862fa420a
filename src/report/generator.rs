//! Report generation.
//!
//! This module serializes the combined summary table as CSV or JSON and
//! writes it next to the result folders.

use crate::cli::OutputFormat;
use crate::models::{JsonReport, ReportMetadata, SummaryTable};
use anyhow::{Context, Result};
use chrono::Utc;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Suffix appended to the joined folder names.
const OUTPUT_SUFFIX: &str = "_summary_results";

/// Output file name: folder names joined by `_`, plus the results suffix.
pub fn output_file_name(folders: &[String], format: OutputFormat) -> String {
    format!(
        "{}{}.{}",
        folders.join("_"),
        OUTPUT_SUFFIX,
        format.extension()
    )
}

/// Write the table as CSV: a header row, then one row per record.
pub fn write_csv<W: Write>(table: &SummaryTable, writer: W) -> Result<()> {
    let columns = table.columns();
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(columns.iter().map(|c| c.name()))?;

    for record in &table.records {
        csv_writer.write_record(columns.iter().map(|c| c.value(record).to_string()))?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Generate a CSV report.
pub fn generate_csv_report(table: &SummaryTable) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    String::from_utf8(buf).context("CSV output is not valid UTF-8")
}

/// Build the JSON report envelope for a table.
pub fn build_json_report(table: &SummaryTable, folders: &[String]) -> JsonReport {
    let columns = table.columns();

    let records = table
        .records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|c| (c.name().to_string(), c.value(record).to_json()))
                .collect::<serde_json::Map<_, _>>()
        })
        .collect();

    JsonReport {
        metadata: ReportMetadata {
            generated_at: Utc::now(),
            folders: folders.to_vec(),
            total_records: table.len(),
            columns: columns.iter().map(|c| c.name().to_string()).collect(),
        },
        records,
    }
}

/// Generate a JSON report.
pub fn generate_json_report(table: &SummaryTable, folders: &[String]) -> Result<String> {
    serde_json::to_string_pretty(&build_json_report(table, folders)).map_err(Into::into)
}

/// Write the report into `output_dir` and return the path written.
pub fn write_report(
    table: &SummaryTable,
    folders: &[String],
    format: OutputFormat,
    output_dir: &Path,
) -> Result<PathBuf> {
    let content = match format {
        OutputFormat::Csv => generate_csv_report(table)?,
        OutputFormat::Json => generate_json_report(table, folders)?,
    };

    std::fs::create_dir_all(output_dir).with_context(|| {
        format!("Failed to create output directory {}", output_dir.display())
    })?;

    let path = output_dir.join(output_file_name(folders, format));
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    Ok(path)
}
