//! Data models for the summary aggregator.
//!
//! This module contains the records extracted from llmperf summary files,
//! the output column layout, and the table the report is built from.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

/// Multiplier applied to the inter-token latency (source seconds to output ms).
pub const MS_PER_SECOND: f64 = 1000.0;

/// The fields we read from a `*_summary.json` object.
///
/// Missing keys and explicit `null` values both become `None`.
/// Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSummary {
    pub model: Option<String>,
    pub mean_input_tokens: Option<f64>,
    pub mean_output_tokens: Option<f64>,
    pub concurrent_requests: Option<f64>,
    pub results_ttft_s_mean: Option<f64>,
    pub results_inter_token_latency_s_mean: Option<f64>,
    pub results_end_to_end_latency_s_mean: Option<f64>,
}

impl RawSummary {
    /// Extract the known keys from a summary object.
    ///
    /// Values are not type-checked: a numeric key holding a numeric string
    /// is read as that number, any other non-number is logged and treated as
    /// absent. A non-string `model` keeps its JSON text.
    pub fn from_object(object: &Map<String, Value>, source: &str) -> Self {
        Self {
            model: object.get("model").and_then(text_field),
            mean_input_tokens: number_field(object, "mean_input_tokens", source),
            mean_output_tokens: number_field(object, "mean_output_tokens", source),
            concurrent_requests: number_field(object, "concurrent_requests", source),
            results_ttft_s_mean: number_field(object, "results_ttft_s_mean", source),
            results_inter_token_latency_s_mean: number_field(
                object,
                "results_inter_token_latency_s_mean",
                source,
            ),
            results_end_to_end_latency_s_mean: number_field(
                object,
                "results_end_to_end_latency_s_mean",
                source,
            ),
        }
    }
}

fn text_field(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn number_field(object: &Map<String, Value>, key: &str, source: &str) -> Option<f64> {
    match object.get(key)? {
        Value::Null => None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Some(n),
            _ => {
                warn!("{}: {} is not a number ({:?}), leaving it empty", source, key, s);
                None
            }
        },
        other => {
            warn!("{}: {} is not a number ({}), leaving it empty", source, key, other);
            None
        }
    }
}

/// One benchmark run, flattened from a single summary file.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRecord {
    /// Folder the file was found in.
    pub folder_name: String,
    /// Name of the summary file.
    pub file_name: String,
    /// Model identifier, empty when the file has none.
    pub model: String,
    pub mean_input_tokens: Option<f64>,
    pub mean_output_tokens: Option<f64>,
    pub concurrent_requests: Option<f64>,
    /// Time to first token, seconds.
    pub ttft_s_mean: Option<f64>,
    /// Inter-token latency, milliseconds.
    pub inter_token_latency_ms_mean: Option<f64>,
    /// End-to-end latency, seconds.
    pub end_to_end_latency_s_mean: Option<f64>,
}

impl SummaryRecord {
    /// Build a record from a parsed summary, converting ITL to milliseconds.
    pub fn from_raw(raw: RawSummary, folder_name: &str, file_name: &str) -> Self {
        Self {
            folder_name: folder_name.to_string(),
            file_name: file_name.to_string(),
            model: raw.model.unwrap_or_default(),
            mean_input_tokens: raw.mean_input_tokens,
            mean_output_tokens: raw.mean_output_tokens,
            concurrent_requests: raw.concurrent_requests,
            ttft_s_mean: raw.results_ttft_s_mean,
            inter_token_latency_ms_mean: raw
                .results_inter_token_latency_s_mean
                .map(|secs| secs * MS_PER_SECOND),
            end_to_end_latency_s_mean: raw.results_end_to_end_latency_s_mean,
        }
    }
}

/// Output columns, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    FolderName,
    FileName,
    Model,
    MeanInputTokens,
    MeanOutputTokens,
    ConcurrentRequests,
    TtftMean,
    InterTokenLatencyMean,
    EndToEndLatencyMean,
}

impl Column {
    /// Every column in the fixed projection order.
    pub const ALL: [Column; 9] = [
        Column::FolderName,
        Column::FileName,
        Column::Model,
        Column::MeanInputTokens,
        Column::MeanOutputTokens,
        Column::ConcurrentRequests,
        Column::TtftMean,
        Column::InterTokenLatencyMean,
        Column::EndToEndLatencyMean,
    ];

    /// Header name used in the CSV and JSON outputs.
    ///
    /// The ITL header keeps its `_s_` name even though values are in ms.
    pub fn name(&self) -> &'static str {
        match self {
            Column::FolderName => "folder_name",
            Column::FileName => "file_name",
            Column::Model => "model",
            Column::MeanInputTokens => "mean_input_tokens",
            Column::MeanOutputTokens => "mean_output_tokens",
            Column::ConcurrentRequests => "concurrent_requests",
            Column::TtftMean => "results_ttft_s_mean",
            Column::InterTokenLatencyMean => "results_inter_token_latency_s_mean",
            Column::EndToEndLatencyMean => "results_end_to_end_latency_s_mean",
        }
    }

    /// The value this column holds for a record.
    pub fn value<'a>(&self, record: &'a SummaryRecord) -> CellValue<'a> {
        match self {
            Column::FolderName => CellValue::Text(&record.folder_name),
            Column::FileName => CellValue::Text(&record.file_name),
            Column::Model => CellValue::Text(&record.model),
            Column::MeanInputTokens => CellValue::Number(record.mean_input_tokens),
            Column::MeanOutputTokens => CellValue::Number(record.mean_output_tokens),
            Column::ConcurrentRequests => CellValue::Number(record.concurrent_requests),
            Column::TtftMean => CellValue::Number(record.ttft_s_mean),
            Column::InterTokenLatencyMean => CellValue::Number(record.inter_token_latency_ms_mean),
            Column::EndToEndLatencyMean => CellValue::Number(record.end_to_end_latency_s_mean),
        }
    }

    /// Whether the record carries a value for this column.
    pub fn is_populated(&self, record: &SummaryRecord) -> bool {
        match self.value(record) {
            CellValue::Text(_) => true,
            CellValue::Number(n) => n.is_some(),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single cell of the output table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    Text(&'a str),
    Number(Option<f64>),
}

impl CellValue<'_> {
    /// JSON form of the cell; absent numbers become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CellValue::Text(s) => serde_json::Value::String((*s).to_string()),
            CellValue::Number(Some(n)) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            CellValue::Number(None) => serde_json::Value::Null,
        }
    }
}

impl fmt::Display for CellValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(Some(n)) => write!(f, "{}", n),
            CellValue::Number(None) => Ok(()),
        }
    }
}

/// Ordered records, either for one folder or combined across folders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryTable {
    pub records: Vec<SummaryRecord>,
}

impl SummaryTable {
    /// Creates a table from records in discovery order.
    pub fn new(records: Vec<SummaryRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Concatenate tables, keeping each table's internal order.
    pub fn concat(tables: Vec<SummaryTable>) -> Self {
        Self {
            records: tables.into_iter().flat_map(|t| t.records).collect(),
        }
    }

    /// Columns to emit: the fixed order, minus columns no record populates.
    pub fn columns(&self) -> Vec<Column> {
        Column::ALL
            .into_iter()
            .filter(|col| self.records.iter().any(|r| col.is_populated(r)))
            .collect()
    }
}

/// Metadata attached to the JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Folders read, in configured order.
    pub folders: Vec<String>,
    /// Number of records in the report.
    pub total_records: usize,
    /// Projected column names, in order.
    pub columns: Vec<String>,
}

/// The JSON form of the combined table.
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    pub metadata: ReportMetadata,
    pub records: Vec<serde_json::Map<String, serde_json::Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(folder: &str, file: &str) -> SummaryRecord {
        SummaryRecord::from_raw(RawSummary::default(), folder, file)
    }

    fn raw(json: &str) -> RawSummary {
        let value: Value = serde_json::from_str(json).unwrap();
        RawSummary::from_object(value.as_object().unwrap(), "test_summary.json")
    }

    #[test]
    fn test_raw_summary_defaults() {
        let rec = SummaryRecord::from_raw(
            raw(r#"{"unrelated": [1, 2, 3]}"#),
            "recaculation",
            "x_summary.json",
        );

        assert_eq!(rec.model, "");
        assert_eq!(rec.mean_input_tokens, None);
        assert_eq!(rec.concurrent_requests, None);
        assert_eq!(rec.inter_token_latency_ms_mean, None);
        assert_eq!(rec.folder_name, "recaculation");
        assert_eq!(rec.file_name, "x_summary.json");
    }

    #[test]
    fn test_null_is_treated_as_missing() {
        let rec = SummaryRecord::from_raw(
            raw(r#"{"model": null, "results_ttft_s_mean": null}"#),
            "f",
            "a_summary.json",
        );

        assert_eq!(rec.model, "");
        assert_eq!(rec.ttft_s_mean, None);
    }

    #[test]
    fn test_latency_units() {
        let rec = SummaryRecord::from_raw(
            raw(r#"{
                "results_ttft_s_mean": 0.5,
                "results_inter_token_latency_s_mean": 0.02,
                "results_end_to_end_latency_s_mean": 3.0
            }"#),
            "f",
            "a_summary.json",
        );

        assert_eq!(rec.ttft_s_mean, Some(0.5));
        assert_eq!(rec.inter_token_latency_ms_mean, Some(0.02 * 1000.0));
        assert_eq!(rec.end_to_end_latency_s_mean, Some(3.0));
    }

    #[test]
    fn test_numeric_string_is_read_as_number() {
        let summary = raw(r#"{"mean_input_tokens": "100", "concurrent_requests": " 4 "}"#);
        assert_eq!(summary.mean_input_tokens, Some(100.0));
        assert_eq!(summary.concurrent_requests, Some(4.0));
    }

    #[test]
    fn test_wrong_type_becomes_absent() {
        let summary = raw(
            r#"{"mean_input_tokens": "lots", "mean_output_tokens": [1],
                "results_ttft_s_mean": true, "concurrent_requests": 8}"#,
        );
        assert_eq!(summary.mean_input_tokens, None);
        assert_eq!(summary.mean_output_tokens, None);
        assert_eq!(summary.results_ttft_s_mean, None);
        assert_eq!(summary.concurrent_requests, Some(8.0));
    }

    #[test]
    fn test_non_string_model_keeps_json_text() {
        assert_eq!(raw(r#"{"model": 7}"#).model, Some("7".to_string()));
        assert_eq!(raw(r#"{"model": "m1"}"#).model, Some("m1".to_string()));
    }

    #[test]
    fn test_column_order_and_names() {
        let names: Vec<&str> = Column::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(
            names.join(","),
            "folder_name,file_name,model,mean_input_tokens,mean_output_tokens,\
             concurrent_requests,results_ttft_s_mean,results_inter_token_latency_s_mean,\
             results_end_to_end_latency_s_mean"
        );
    }

    #[test]
    fn test_columns_skip_unpopulated() {
        let mut a = record("f", "a_summary.json");
        a.mean_input_tokens = Some(100.0);
        let b = record("f", "b_summary.json");
        let table = SummaryTable::new(vec![a, b]);

        assert_eq!(
            table.columns(),
            vec![
                Column::FolderName,
                Column::FileName,
                Column::Model,
                Column::MeanInputTokens
            ]
        );
    }

    #[test]
    fn test_concat_preserves_order() {
        let t1 = SummaryTable::new(vec![record("a", "2"), record("a", "1")]);
        let t2 = SummaryTable::new(vec![record("b", "3")]);
        let combined = SummaryTable::concat(vec![t1, t2]);

        let files: Vec<&str> = combined.records.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(files, vec!["2", "1", "3"]);
        assert_eq!(combined.len(), 3);
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(CellValue::Number(Some(100.0)).to_string(), "100");
        assert_eq!(CellValue::Number(Some(0.5)).to_string(), "0.5");
        assert_eq!(CellValue::Number(None).to_string(), "");
        assert_eq!(CellValue::Text("m1").to_string(), "m1");
        assert_eq!(CellValue::Number(None).to_json(), serde_json::Value::Null);
    }
}
