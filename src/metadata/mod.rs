pub mod csv;
pub mod jsonl;

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::historytrends::{ExportKind, Visit};

/// One decoded visit, tagged with where it came from.
#[derive(Debug, Clone, Serialize)]
pub struct VisitRecord {
    pub run_id: String,
    pub source_file: String,
    pub export_kind: Option<ExportKind>,
    /// 1-based position in the export.
    pub record: u64,
    pub url: String,
    pub visit_time: Option<DateTime<Utc>>,
    pub transition: u32,
    pub transition_name: String,
    pub page_title: String,
}

impl VisitRecord {
    pub fn from_visit(
        run_id: &str,
        source_file: &str,
        export_kind: Option<ExportKind>,
        record: u64,
        visit: &Visit,
    ) -> Self {
        Self {
            run_id: run_id.to_string(),
            source_file: source_file.to_string(),
            export_kind,
            record,
            url: visit.url.clone(),
            visit_time: visit.visit_time,
            transition: visit.transition.0,
            transition_name: visit.transition.to_string(),
            page_title: visit.page_title.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub filename: String,
    pub export_kind: Option<ExportKind>,
    pub export_time: String,
    pub visits: u64,
    pub input_sha256: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataBackendKind {
    Jsonl,
    Csv,
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Metadata output sink for decoded visits.
///
/// # Example
/// ```rust
/// use histrends::metadata::{self, MetadataBackendKind, RunSummary};
///
/// let run_output_dir = std::env::temp_dir().join("histrends_meta_example");
/// std::fs::create_dir_all(&run_output_dir).unwrap();
///
/// let sink = metadata::build_sink(
///     MetadataBackendKind::Jsonl,
///     "0.1.0",
///     "config-hash",
///     &run_output_dir,
/// )
/// .unwrap();
///
/// let summary = RunSummary {
///     run_id: "example_run".to_string(),
///     filename: "exported_archived_history_20131116.tsv".to_string(),
///     export_kind: None,
///     export_time: "2013-11-16T00:00:00+00:00".to_string(),
///     visits: 0,
///     input_sha256: String::new(),
/// };
/// sink.record_summary(&summary).unwrap();
/// sink.flush().unwrap();
/// ```
pub trait MetadataSink: Send + Sync {
    fn record_visit(&self, record: &VisitRecord) -> Result<(), MetadataError>;
    fn record_summary(&self, summary: &RunSummary) -> Result<(), MetadataError>;
    fn flush(&self) -> Result<(), MetadataError>;
}

pub fn build_sink(
    backend: MetadataBackendKind,
    tool_version: &str,
    config_hash: &str,
    run_output_dir: &Path,
) -> Result<Box<dyn MetadataSink>, MetadataError> {
    match backend {
        MetadataBackendKind::Jsonl => Ok(Box::new(jsonl::JsonlSink::new(
            tool_version,
            config_hash,
            run_output_dir,
        )?)),
        MetadataBackendKind::Csv => Ok(Box::new(csv::CsvSink::new(
            tool_version,
            config_hash,
            run_output_dir,
        )?)),
    }
}
