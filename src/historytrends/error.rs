use thiserror::Error;

use crate::timefmt::TimeFmtError;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    /// Input that cannot be interpreted at all.
    #[error("format error: {0}")]
    Format(String),
    /// Input that parses but is inconsistent with itself.
    #[error("validation error: {0}")]
    Validation(String),
    #[error("record {record}: {source}")]
    Record {
        record: usize,
        #[source]
        source: Box<ExportError>,
    },
}

impl ExportError {
    pub(crate) fn at_record(self, record: usize) -> Self {
        match self {
            ExportError::Record { .. } => self,
            other => ExportError::Record {
                record,
                source: Box::new(other),
            },
        }
    }

    /// The error with any record wrapper removed.
    pub fn root(&self) -> &ExportError {
        match self {
            ExportError::Record { source, .. } => source.root(),
            other => other,
        }
    }

    /// 1-based index of the record that failed, when known.
    pub fn record(&self) -> Option<usize> {
        match self {
            ExportError::Record { record, .. } => Some(*record),
            _ => None,
        }
    }

    pub fn is_format(&self) -> bool {
        matches!(self.root(), ExportError::Format(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.root(), ExportError::Validation(_))
    }

    pub fn is_io(&self) -> bool {
        matches!(self.root(), ExportError::Io(_))
    }
}

impl From<TimeFmtError> for ExportError {
    fn from(err: TimeFmtError) -> Self {
        ExportError::Format(err.to_string())
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        let msg = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(io) => ExportError::Io(io),
            _ => ExportError::Format(msg),
        }
    }
}
