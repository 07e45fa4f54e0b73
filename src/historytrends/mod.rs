//! # History Trends Module
//!
//! Reader and writer for browsing history exported by the History Trends
//! Unlimited Chromium extension.
//!
//! Two record layouts exist, told apart by field count:
//!
//! - analysis ("Export These Results"): `URL, Host, Domain, VisitTimeMillis,
//!   VisitTimeLocal, Weekday, TransitionName, PageTitle`
//! - archived ("Transfer History" and auto backups): `URL, EpochTime,
//!   TransitionInt[, PageTitle]`
//!
//! Records are tab-separated and CRLF-terminated, and fields are never
//! quoted.
//!
//! # Example
//! ```rust
//! use histrends::historytrends::{ExportKind, ExportReader};
//!
//! let data = "http://example.com/\texample.com\texample.com\t1384634958041\t\
//!             2013-11-16 14:49:18.041\t6\tlink\tExample\r\n";
//! let time = chrono::NaiveDate::from_ymd_opt(2013, 11, 16)
//!     .unwrap()
//!     .and_hms_opt(14, 49, 18)
//!     .unwrap();
//! let mut reader = ExportReader::new(data.as_bytes(), Some(ExportKind::Analysis), time);
//! let export = reader.read_all().unwrap();
//! assert_eq!(export.visits.len(), 1);
//! assert_eq!(export.time.offset().local_minus_utc(), -6 * 3600);
//! ```

mod analysis;
mod archived;
mod classify;
mod error;
mod filename;
mod reader;
mod title;
mod writer;

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::transition::PageTransition;

pub use classify::classify;
pub use error::ExportError;
pub use filename::{BackupKind, ExportFilename, export_filename, parse_filename};
pub use reader::ExportReader;
pub use title::normalize_title;
pub use writer::ExportWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Analysis,
    Archived,
}

impl ExportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportKind::Analysis => "analysis",
            ExportKind::Archived => "archived",
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportKind {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "analysis" => Ok(ExportKind::Analysis),
            "archived" => Ok(ExportKind::Archived),
            _ => Err(ExportError::Validation(format!("illegal export type: {s:?}"))),
        }
    }
}

/// A page visit. URL and visit time together are unique within an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Visit {
    pub url: String,
    /// UTC. `None` when an archived record leaves the time column blank.
    pub visit_time: Option<DateTime<Utc>>,
    pub transition: PageTransition,
    pub page_title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Export {
    /// Base name of the export, or of the file inside its zip.
    pub filename: String,
    /// `None` only for an empty stream whose kind was never given.
    pub kind: Option<ExportKind>,
    /// Export time; local for analysis exports, UTC for archived ones.
    pub time: DateTime<FixedOffset>,
    pub visits: Vec<Visit>,
}

impl Export {
    /// Encode the whole export in its own layout.
    pub fn write_to<W: Write>(&self, w: W) -> Result<W, ExportError> {
        let kind = self
            .kind
            .ok_or_else(|| ExportError::Validation("illegal export type: unknown".to_string()))?;
        let mut writer = ExportWriter::new(w, kind, self.time);
        writer.write_all(&self.visits)?;
        writer.into_inner()
    }
}
