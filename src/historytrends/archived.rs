//! Archived export records ("Transfer History" and auto backups).
//!
//! ```text
//! 0: URL              visited URL
//! 1: Visit Time       U1384634958041.754 (Unix ms) or 13149893660345543 (Windows us)
//! 2: Transition Type  full transition bitfield as a decimal integer
//! 3: Page Title*      column may be missing altogether
//! ```

use chrono::{DateTime, Utc};

use crate::historytrends::{ExportError, Visit, normalize_title};
use crate::timefmt::{self, Epoch, Unit};
use crate::transition::PageTransition;

/// Marks a Unix millisecond time (v1.4.1 and later).
const UNIX_MARKER: char = 'U';

pub(crate) fn decode(fields: &[&str]) -> Result<Visit, ExportError> {
    let (url, time, transition, title) = match fields {
        [url, time, transition] => (url, time, transition, ""),
        [url, time, transition, title] => (url, time, transition, *title),
        _ => {
            return Err(ExportError::Format(format!(
                "archived record has {} fields",
                fields.len()
            )));
        }
    };

    let transition: u32 = transition
        .parse()
        .map_err(|_| ExportError::Format(format!("bad transition {transition:?}")))?;

    Ok(Visit {
        url: url.to_string(),
        visit_time: parse_epoch_time(time)?,
        transition: PageTransition(transition),
        page_title: normalize_title(title),
    })
}

/// A blank column or a zero count (`0`, `U0`, `0.0`) means the time is
/// unknown.
fn parse_epoch_time(s: &str) -> Result<Option<DateTime<Utc>>, ExportError> {
    if s.is_empty() {
        return Ok(None);
    }
    let (count, unit, epoch) = match s.strip_prefix(UNIX_MARKER) {
        Some(millis) => (millis, Unit::Milli, Epoch::Unix),
        None => (s, Unit::Micro, Epoch::Windows),
    };
    let (n, nsec) = timefmt::split_count(count, unit)?;
    if n == 0 && nsec == 0 {
        return Ok(None);
    }
    Ok(Some(timefmt::from_int(n, nsec, unit, epoch)?))
}

/// `U` + Unix milliseconds, except the Unix epoch itself, which would read
/// back as the zero sentinel and is written as Windows microseconds.
fn format_epoch_time(t: DateTime<Utc>) -> String {
    if timefmt::to_int(t, Unit::Milli, Epoch::Unix) == (0, 0) {
        return timefmt::format(t, Unit::Micro, Epoch::Windows);
    }
    format!("{UNIX_MARKER}{}", timefmt::format(t, Unit::Milli, Epoch::Unix))
}

pub(crate) fn encode(visit: &Visit) -> Vec<String> {
    let time = visit
        .visit_time
        .map(format_epoch_time)
        .unwrap_or_default();
    vec![
        visit.url.clone(),
        time,
        visit.transition.0.to_string(),
        visit.page_title.clone(),
    ]
}
