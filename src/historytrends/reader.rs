use std::io::Read;
use std::path::Path;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use tracing::{debug, info};

use crate::historytrends::classify::lock_kind;
use crate::historytrends::{Export, ExportError, ExportKind, Visit, analysis, archived, parse_filename};
use crate::source;

/// Timezone knowledge of an analysis export. Archived exports never leave
/// `Unknown` since their times are UTC already.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ZoneState {
    Unknown,
    Fixed(FixedOffset),
}

/// Reads History Trends Unlimited exports one visit at a time.
pub struct ExportReader<R> {
    records: csv::Reader<R>,
    row: csv::StringRecord,
    filename: String,
    kind: Option<ExportKind>,
    time: DateTime<FixedOffset>,
    zone: ZoneState,
    record: usize,
}

impl ExportReader<Box<dyn Read>> {
    /// Open a `.tsv`/`.txt` export, or a `.zip` holding exactly one.
    ///
    /// Kind and export time come from the filename; for a zip the inner
    /// name is used, which recovers the original name of renamed archives.
    pub fn open(path: &Path) -> Result<Self, ExportError> {
        let src = source::open_export_source(path)?;
        let parsed = parse_filename(&src.name)?;
        info!(
            "opened {} export {} (time={})",
            parsed.kind,
            src.name,
            parsed.time
        );
        Ok(ExportReader::new(src.reader, Some(parsed.kind), parsed.time).with_filename(src.name))
    }
}

impl<R: Read> ExportReader<R> {
    /// Wrap an already open stream. With `kind` unset the first record
    /// decides it. `time` is the export's wall-clock time.
    pub fn new(reader: R, kind: Option<ExportKind>, time: NaiveDateTime) -> Self {
        let records = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .quoting(false)
            .flexible(true)
            .from_reader(reader);
        Self {
            records,
            row: csv::StringRecord::new(),
            filename: String::new(),
            kind,
            time: time.and_utc().fixed_offset(),
            zone: ZoneState::Unknown,
            record: 0,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn kind(&self) -> Option<ExportKind> {
        self.kind
    }

    /// Export time. For analysis exports this is UTC until the first record
    /// reveals the exporting machine's offset.
    ///
    /// The offset is east-positive: local = UTC - diff, where diff is the
    /// record's millisecond time minus its local time. A machine six hours
    /// behind UTC yields -06:00 with the wall-clock time unchanged.
    pub fn time(&self) -> DateTime<FixedOffset> {
        self.time
    }

    /// Offset inferred from the first analysis record.
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        match self.zone {
            ZoneState::Fixed(offset) => Some(offset),
            ZoneState::Unknown => None,
        }
    }

    /// 1-based index of the last record read.
    pub fn record(&self) -> usize {
        self.record
    }

    /// Read the next visit, or `None` at end of stream.
    pub fn read(&mut self) -> Result<Option<Visit>, ExportError> {
        let record = self.record + 1;
        let more = self
            .records
            .read_record(&mut self.row)
            .map_err(|err| ExportError::from(err).at_record(record))?;
        if !more {
            return Ok(None);
        }
        self.record = record;
        self.decode_row().map(Some).map_err(|err| err.at_record(record))
    }

    fn decode_row(&mut self) -> Result<Visit, ExportError> {
        let fields: Vec<&str> = self.row.iter().collect();
        match lock_kind(&mut self.kind, fields.len())? {
            ExportKind::Archived => archived::decode(&fields),
            ExportKind::Analysis => {
                let decoded = analysis::decode(&fields)?;
                match self.zone {
                    ZoneState::Unknown => {
                        self.time = decoded
                            .offset
                            .from_local_datetime(&self.time.naive_local())
                            .single()
                            .ok_or_else(|| {
                                ExportError::Validation(format!(
                                    "export time {} does not exist at offset {}",
                                    self.time.naive_local(),
                                    decoded.offset
                                ))
                            })?;
                        self.zone = ZoneState::Fixed(decoded.offset);
                        debug!("inferred export timezone {}", decoded.offset);
                    }
                    ZoneState::Fixed(expected) if expected != decoded.offset => {
                        return Err(ExportError::Validation(format!(
                            "timezone offset {} differs from export offset {}",
                            decoded.offset, expected
                        )));
                    }
                    ZoneState::Fixed(_) => {}
                }
                Ok(decoded.visit)
            }
        }
    }

    /// Read every remaining visit.
    ///
    /// On error the visits read so far are dropped and only the error is
    /// returned.
    pub fn read_all(&mut self) -> Result<Export, ExportError> {
        let mut visits = Vec::new();
        while let Some(visit) = self.read()? {
            visits.push(visit);
        }
        info!(
            "read {} visits from {}",
            visits.len(),
            if self.filename.is_empty() { "stream" } else { &self.filename }
        );
        Ok(Export {
            filename: self.filename.clone(),
            kind: self.kind,
            time: self.time,
            visits,
        })
    }

    pub fn into_inner(self) -> R {
        self.records.into_inner()
    }
}

impl<R: Read> Iterator for ExportReader<R> {
    type Item = Result<Visit, ExportError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read().transpose()
    }
}
