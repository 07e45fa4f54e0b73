use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use serde::Serialize;

use crate::metadata::{MetadataError, MetadataSink, RunSummary, VisitRecord};

pub struct JsonlSink {
    tool_version: String,
    config_hash: String,
    visits_writer: Mutex<BufWriter<File>>,
    run_writer: Mutex<BufWriter<File>>,
}

#[derive(Serialize)]
struct Tagged<'a, T> {
    #[serde(flatten)]
    inner: &'a T,
    tool_version: &'a str,
    config_hash: &'a str,
}

impl JsonlSink {
    pub fn new(tool_version: &str, config_hash: &str, run_output_dir: &Path) -> Result<Self, MetadataError> {
        let meta_dir = run_output_dir.join("metadata");
        std::fs::create_dir_all(&meta_dir)?;
        let visits_file = File::create(meta_dir.join("visits.jsonl"))?;
        let run_file = File::create(meta_dir.join("run_summary.jsonl"))?;
        Ok(Self {
            tool_version: tool_version.to_string(),
            config_hash: config_hash.to_string(),
            visits_writer: Mutex::new(BufWriter::new(visits_file)),
            run_writer: Mutex::new(BufWriter::new(run_file)),
        })
    }

    fn write_line<T: Serialize>(&self, writer: &Mutex<BufWriter<File>>, inner: &T) -> Result<(), MetadataError> {
        let record = Tagged {
            inner,
            tool_version: &self.tool_version,
            config_hash: &self.config_hash,
        };
        let mut guard = writer.lock().unwrap();
        serde_json::to_writer(&mut *guard, &record)?;
        guard.write_all(b"\n")?;
        Ok(())
    }
}

impl MetadataSink for JsonlSink {
    fn record_visit(&self, record: &VisitRecord) -> Result<(), MetadataError> {
        self.write_line(&self.visits_writer, record)
    }

    fn record_summary(&self, summary: &RunSummary) -> Result<(), MetadataError> {
        self.write_line(&self.run_writer, summary)
    }

    fn flush(&self) -> Result<(), MetadataError> {
        self.visits_writer.lock().unwrap().flush()?;
        self.run_writer.lock().unwrap().flush()?;
        Ok(())
    }
}
