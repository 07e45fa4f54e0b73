use std::io::Write;

use chrono::{DateTime, FixedOffset};

use crate::historytrends::{ExportError, ExportKind, Visit, analysis, archived};

/// Writes visits in one export layout.
///
/// Fields are tab-joined and records end in CRLF. Nothing is quoted, so a
/// URL or title holding a tab or line break corrupts the output, exactly as
/// the extension's own exports would be.
pub struct ExportWriter<W: Write> {
    records: csv::Writer<W>,
    kind: ExportKind,
    zone: FixedOffset,
    record: usize,
}

impl<W: Write> ExportWriter<W> {
    /// `export_time` supplies the zone local times are rendered in for
    /// analysis exports. Archived exports are always written in UTC.
    pub fn new(w: W, kind: ExportKind, export_time: DateTime<FixedOffset>) -> Self {
        let records = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .quote_style(csv::QuoteStyle::Never)
            .terminator(csv::Terminator::CRLF)
            .from_writer(w);
        Self {
            records,
            kind,
            zone: *export_time.offset(),
            record: 0,
        }
    }

    pub fn kind(&self) -> ExportKind {
        self.kind
    }

    pub fn write(&mut self, visit: &Visit) -> Result<(), ExportError> {
        self.record += 1;
        let record = self.record;
        let fields = match self.kind {
            ExportKind::Analysis => analysis::encode(visit, self.zone),
            ExportKind::Archived => Ok(archived::encode(visit)),
        }
        .map_err(|err| err.at_record(record))?;
        self.records
            .write_record(&fields)
            .map_err(|err| ExportError::from(err).at_record(record))
    }

    pub fn write_all(&mut self, visits: &[Visit]) -> Result<(), ExportError> {
        for visit in visits {
            self.write(visit)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), ExportError> {
        self.records.flush()?;
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W, ExportError> {
        self.records
            .into_inner()
            .map_err(|err| ExportError::Io(err.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::historytrends::ExportReader;
    use crate::transition::PageTransition;

    fn visit(millis: i64, transition: u32, title: &str) -> Visit {
        Visit {
            url: "https://news.example.co.uk/story?id=1".to_string(),
            visit_time: Utc.timestamp_millis_opt(millis).single(),
            transition: PageTransition(transition),
            page_title: title.to_string(),
        }
    }

    #[test]
    fn writes_archived_records() {
        let utc = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap().fixed_offset();
        let mut writer = ExportWriter::new(Vec::new(), ExportKind::Archived, utc);
        writer.write(&visit(1_384_634_958_041, 0x0100_0001, "Story")).expect("write");
        writer
            .write(&Visit {
                visit_time: None,
                ..visit(0, 0, "")
            })
            .expect("write");
        let out = String::from_utf8(writer.into_inner().expect("inner")).expect("utf8");
        assert_eq!(
            out,
            "https://news.example.co.uk/story?id=1\tU1384634958041\t16777217\tStory\r\n\
             https://news.example.co.uk/story?id=1\t\t0\t\r\n"
        );
    }

    #[test]
    fn writes_analysis_records_in_export_zone() {
        let zone = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let export_time = zone.with_ymd_and_hms(2013, 11, 17, 2, 19, 18).unwrap();
        let mut writer = ExportWriter::new(Vec::new(), ExportKind::Analysis, export_time);
        writer.write(&visit(1_384_634_958_041, PageTransition::RELOAD.0, "Story")).expect("write");
        let out = String::from_utf8(writer.into_inner().expect("inner")).expect("utf8");
        assert_eq!(
            out,
            "https://news.example.co.uk/story?id=1\tnews.example.co.uk\texample.co.uk\t1384634958041\t\
             2013-11-17 02:19:18.041\t0\treload\tStory\r\n"
        );
    }

    #[test]
    fn write_error_carries_record_index() {
        let utc = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap().fixed_offset();
        let mut writer = ExportWriter::new(Vec::new(), ExportKind::Analysis, utc);
        writer.write(&visit(1, 0, "ok")).expect("write");
        let err = writer.write(&visit(1, 0xEE, "bad")).expect_err("transition");
        assert!(err.is_validation());
        assert_eq!(err.record(), Some(2));
    }

    #[test]
    fn analysis_output_reads_back_with_same_zone() {
        let zone = FixedOffset::west_opt(8 * 3600).unwrap();
        let export_time = zone.with_ymd_and_hms(2021, 6, 1, 9, 30, 0).unwrap();
        let mut writer = ExportWriter::new(Vec::new(), ExportKind::Analysis, export_time);
        writer.write(&visit(1_622_560_000_123, 1, "t")).expect("write");
        let bytes = writer.into_inner().expect("inner");

        let mut reader = ExportReader::new(bytes.as_slice(), Some(ExportKind::Analysis), export_time.naive_local());
        reader.read_all().expect("read_all");
        assert_eq!(reader.utc_offset(), Some(zone));
        assert_eq!(reader.time(), export_time);
    }
}
