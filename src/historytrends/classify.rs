use crate::historytrends::{ExportError, ExportKind};

/// Export kind implied by a record's field count.
///
/// Some versions omit the archived title column entirely, so both 3 and 4
/// fields are archived records.
pub fn classify(field_count: usize) -> Result<ExportKind, ExportError> {
    match field_count {
        8 => Ok(ExportKind::Analysis),
        3 | 4 => Ok(ExportKind::Archived),
        n => Err(ExportError::Format(format!("record has {n} fields"))),
    }
}

/// Classify a record and check it against the kind already established for
/// the stream, fixing the kind on first use.
pub(crate) fn lock_kind(established: &mut Option<ExportKind>, field_count: usize) -> Result<ExportKind, ExportError> {
    let kind = classify(field_count)?;
    match *established {
        Some(expected) if expected != kind => Err(ExportError::Format(format!(
            "record has {field_count} fields, which does not fit a {expected} export"
        ))),
        Some(expected) => Ok(expected),
        None => {
            *established = Some(kind);
            Ok(kind)
        }
    }
}
