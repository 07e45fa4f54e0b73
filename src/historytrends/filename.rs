//! Export filename grammar.
//!
//! Names produced by History Trends Unlimited so far:
//!
//! - `exported_analysis_history_{YYYYMMDD_HHMMSS}.tsv` (>= v1.5.2)
//! - `exported_analysis_history_{YYYYMMDD}.tsv` (< v1.5.2, `.txt` before v1.4.3)
//! - `exported_archived_history_{YYYYMMDD}.{tsv|txt}`
//! - `history_autobackup_{YYYYMMDD}_{full|incremental}.{tsv|txt|zip}`
//!
//! The grammar accepts a few more combinations than that, plus a suffix
//! such as ` (1)` left by browsers when saving duplicates.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::historytrends::{ExportError, ExportKind};

static FILENAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?:exported_(analysis|archived)_history_([0-9]{8}(?:_[0-9]{6})?)",
        r"|history_autobackup_([0-9]{8}(?:_[0-9]{6})?)_(full|incremental))",
        r"(?:[^0-9].*)?",
        r"\.(?:tsv|txt|zip)$",
    ))
    .expect("filename regex")
});

const DATE_FORMAT: &str = "%Y%m%d";
const DATE_TIME_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupKind {
    Full,
    Incremental,
}

impl fmt::Display for BackupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupKind::Full => f.write_str("full"),
            BackupKind::Incremental => f.write_str("incremental"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFilename {
    pub kind: ExportKind,
    /// Wall-clock export time; the zone is not part of the name.
    pub time: NaiveDateTime,
    /// Set for `history_autobackup_*` names.
    pub backup: Option<BackupKind>,
}

pub fn parse_filename(name: &str) -> Result<ExportFilename, ExportError> {
    let caps = FILENAME_PATTERN
        .captures(name)
        .ok_or_else(|| ExportError::Format(format!("filename is not an export: {name:?}")))?;

    let (kind, stamp, backup) = match (caps.get(1), caps.get(2)) {
        (Some(kind), Some(stamp)) => {
            let kind = if kind.as_str() == "analysis" {
                ExportKind::Analysis
            } else {
                ExportKind::Archived
            };
            (kind, stamp.as_str(), None)
        }
        _ => {
            let stamp = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
            let backup = match caps.get(4).map(|m| m.as_str()) {
                Some("full") => BackupKind::Full,
                _ => BackupKind::Incremental,
            };
            (ExportKind::Archived, stamp, Some(backup))
        }
    };

    Ok(ExportFilename {
        kind,
        time: parse_stamp(stamp)?,
        backup,
    })
}

fn parse_stamp(stamp: &str) -> Result<NaiveDateTime, ExportError> {
    let bad = |err: chrono::ParseError| ExportError::Format(format!("bad export time {stamp:?}: {err}"));
    if stamp.len() == 8 {
        let date = NaiveDate::parse_from_str(stamp, DATE_FORMAT).map_err(bad)?;
        Ok(date.and_time(chrono::NaiveTime::MIN))
    } else {
        NaiveDateTime::parse_from_str(stamp, DATE_TIME_FORMAT).map_err(bad)
    }
}

/// Canonical filename current extension versions use for `kind`.
pub fn export_filename(kind: ExportKind, time: NaiveDateTime) -> String {
    match kind {
        ExportKind::Analysis => format!("exported_analysis_history_{}.tsv", time.format(DATE_TIME_FORMAT)),
        ExportKind::Archived => format!("exported_archived_history_{}.tsv", time.format(DATE_FORMAT)),
    }
}
