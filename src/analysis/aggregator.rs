//! Summary aggregation.
//!
//! This module turns summary files into records, collects them per folder,
//! and merges the folders into one sorted table.

use crate::error::SummaryError;
use crate::models::{RawSummary, SummaryRecord, SummaryTable};
use crate::scanner::SummaryScanner;
use serde_json::Value;
use std::cmp::Ordering;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Parse one summary file into a record.
pub fn parse_record(
    path: &Path,
    file_name: &str,
    folder_name: &str,
) -> Result<SummaryRecord, SummaryError> {
    let content = fs::read_to_string(path).map_err(|source| SummaryError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let value: Value = serde_json::from_str(&content).map_err(|source| SummaryError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let object = match value {
        Value::Object(object) => object,
        other => {
            return Err(SummaryError::NotAnObject {
                path: path.to_path_buf(),
                found: json_kind(&other),
            })
        }
    };

    let raw = RawSummary::from_object(&object, &path.display().to_string());
    Ok(SummaryRecord::from_raw(raw, folder_name, file_name))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Read every summary file of one folder, in discovery order.
///
/// A folder without summary files yields an empty table.
pub fn process_folder(
    scanner: &SummaryScanner,
    folder_name: &str,
) -> Result<SummaryTable, SummaryError> {
    let files = scanner.locate(folder_name)?;

    let mut records = Vec::with_capacity(files.len());
    for file in &files {
        debug!("Parsing {}", file.path.display());
        records.push(parse_record(&file.path, &file.file_name, folder_name)?);
    }

    info!("Folder {}: {} summary files", folder_name, records.len());
    Ok(SummaryTable::new(records))
}

/// Aggregate all folders into one sorted table.
///
/// Returns `Ok(None)` when no folder contained a summary file.
pub fn aggregate(
    scanner: &SummaryScanner,
    folders: &[String],
) -> Result<Option<SummaryTable>, SummaryError> {
    let mut tables = Vec::new();

    for folder_name in folders {
        let table = process_folder(scanner, folder_name)?;
        if !table.is_empty() {
            tables.push(table);
        }
    }

    if tables.is_empty() {
        return Ok(None);
    }

    let mut combined = SummaryTable::concat(tables);
    sort_records(&mut combined.records);
    Ok(Some(combined))
}

/// Stable sort by folder name, then concurrency, then mean input tokens.
pub fn sort_records(records: &mut [SummaryRecord]) {
    records.sort_by(compare_records);
}

/// Ordering used for the report rows.
pub fn compare_records(a: &SummaryRecord, b: &SummaryRecord) -> Ordering {
    a.folder_name
        .cmp(&b.folder_name)
        .then_with(|| cmp_missing_last(a.concurrent_requests, b.concurrent_requests))
        .then_with(|| cmp_missing_last(a.mean_input_tokens, b.mean_input_tokens))
}

/// Ascending numeric order with absent values after every present one.
fn cmp_missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
