use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use serde::Serialize;

use crate::metadata::{MetadataError, MetadataSink, RunSummary, VisitRecord};

pub struct CsvSink {
    tool_version: String,
    config_hash: String,
    visits_writer: Mutex<csv::Writer<File>>,
    run_writer: Mutex<csv::Writer<File>>,
}

#[derive(Serialize)]
struct VisitCsv<'a> {
    run_id: &'a str,
    source_file: &'a str,
    export_kind: Option<&'a str>,
    record: u64,
    url: &'a str,
    visit_time: Option<String>,
    transition: u32,
    transition_name: &'a str,
    page_title: &'a str,
    tool_version: &'a str,
    config_hash: &'a str,
}

#[derive(Serialize)]
struct RunSummaryCsv<'a> {
    run_id: &'a str,
    filename: &'a str,
    export_kind: Option<&'a str>,
    export_time: &'a str,
    visits: u64,
    input_sha256: &'a str,
    tool_version: &'a str,
    config_hash: &'a str,
}

impl CsvSink {
    pub fn new(tool_version: &str, config_hash: &str, run_output_dir: &Path) -> Result<Self, MetadataError> {
        let meta_dir = run_output_dir.join("metadata");
        std::fs::create_dir_all(&meta_dir)?;

        let visits_file = File::create(meta_dir.join("visits.csv"))?;
        let run_file = File::create(meta_dir.join("run_summary.csv"))?;

        let mut visits_writer = csv::WriterBuilder::new().has_headers(false).from_writer(visits_file);
        let mut run_writer = csv::WriterBuilder::new().has_headers(false).from_writer(run_file);

        visits_writer.write_record([
            "run_id",
            "source_file",
            "export_kind",
            "record",
            "url",
            "visit_time",
            "transition",
            "transition_name",
            "page_title",
            "tool_version",
            "config_hash",
        ])?;

        run_writer.write_record([
            "run_id",
            "filename",
            "export_kind",
            "export_time",
            "visits",
            "input_sha256",
            "tool_version",
            "config_hash",
        ])?;

        Ok(Self {
            tool_version: tool_version.to_string(),
            config_hash: config_hash.to_string(),
            visits_writer: Mutex::new(visits_writer),
            run_writer: Mutex::new(run_writer),
        })
    }
}

impl MetadataSink for CsvSink {
    fn record_visit(&self, record: &VisitRecord) -> Result<(), MetadataError> {
        let row = VisitCsv {
            run_id: &record.run_id,
            source_file: &record.source_file,
            export_kind: record.export_kind.map(|k| k.as_str()),
            record: record.record,
            url: &record.url,
            visit_time: record.visit_time.map(|t| t.to_rfc3339()),
            transition: record.transition,
            transition_name: &record.transition_name,
            page_title: &record.page_title,
            tool_version: &self.tool_version,
            config_hash: &self.config_hash,
        };
        let mut guard = self.visits_writer.lock().unwrap();
        guard.serialize(row)?;
        Ok(())
    }

    fn record_summary(&self, summary: &RunSummary) -> Result<(), MetadataError> {
        let row = RunSummaryCsv {
            run_id: &summary.run_id,
            filename: &summary.filename,
            export_kind: summary.export_kind.map(|k| k.as_str()),
            export_time: &summary.export_time,
            visits: summary.visits,
            input_sha256: &summary.input_sha256,
            tool_version: &self.tool_version,
            config_hash: &self.config_hash,
        };
        let mut guard = self.run_writer.lock().unwrap();
        guard.serialize(row)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), MetadataError> {
        let mut visits = self.visits_writer.lock().unwrap();
        let mut run = self.run_writer.lock().unwrap();
        visits.flush()?;
        run.flush()?;
        Ok(())
    }
}
