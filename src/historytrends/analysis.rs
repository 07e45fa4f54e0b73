//! Analysis export records ("Export These Results").
//!
//! ```text
//! 0: URL                  visited URL
//! 1: Host*                hostname of the URL
//! 2: Domain*              eTLD+1 of the host
//! 3: Visit Time (ms)      milliseconds since 1970, e.g. 1384634958041.754
//! 4: Visit Time (string)  local time, e.g. 2013-11-16 14:49:18.041
//! 5: Day of Week          0 for Sunday
//! 6: Transition Type      core type name, e.g. link
//! 7: Page Title*
//! * may be blank
//! ```

use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, Utc};
use url::{Host, Url};

use crate::historytrends::{ExportError, Visit, normalize_title};
use crate::timefmt::{self, Epoch, Unit};
use crate::transition::PageTransition;

const LOCAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// A decoded analysis record and the UTC offset its two times imply.
#[derive(Debug)]
pub(crate) struct AnalysisRecord {
    pub visit: Visit,
    pub offset: FixedOffset,
}

pub(crate) fn decode(fields: &[&str]) -> Result<AnalysisRecord, ExportError> {
    let [url, host, domain, millis, local, weekday, transition, title] = fields else {
        return Err(ExportError::Format(format!(
            "analysis record has {} fields",
            fields.len()
        )));
    };

    check_url(url, host, domain)?;
    let (visit_time, offset) = parse_times(millis, local, weekday)?;
    let transition = PageTransition::from_name(transition)
        .ok_or_else(|| ExportError::Format(format!("unrecognized transition type: {transition:?}")))?;

    Ok(AnalysisRecord {
        visit: Visit {
            url: url.to_string(),
            visit_time: Some(visit_time),
            transition,
            page_title: normalize_title(title),
        },
        offset,
    })
}

fn check_url(raw_url: &str, host: &str, domain: &str) -> Result<(), ExportError> {
    if !host.is_empty() {
        let url = Url::parse(raw_url)
            .map_err(|err| ExportError::Format(format!("bad url {raw_url:?}: {err}")))?;
        let computed = url_hostname(&url);
        // The extension's host extraction takes the segment after an `@`
        // anywhere in the URL, so https://web.archive.org/save/https://medium.com/@user/x
        // is recorded with host "user".
        if computed != host && !url.path().contains('@') {
            return Err(ExportError::Validation(format!(
                "host {host:?} differs from computed host {computed:?}"
            )));
        }
    }
    if !domain.is_empty() {
        let computed = registrable_domain(host).ok_or_else(|| {
            ExportError::Validation(format!("host {host:?} has no registrable domain"))
        })?;
        if computed != domain {
            return Err(ExportError::Validation(format!(
                "domain {domain:?} differs from computed eTLD+1 {computed:?}"
            )));
        }
    }
    Ok(())
}

/// Both times describe the same instant: `millis` in UTC with
/// sub-millisecond precision, `local` in the exporting machine's zone,
/// truncated to milliseconds.
fn parse_times(millis: &str, local: &str, weekday: &str) -> Result<(DateTime<Utc>, FixedOffset), ExportError> {
    let utc = timefmt::parse(millis, Unit::Milli, Epoch::Unix)?;
    let local = NaiveDateTime::parse_from_str(local, LOCAL_FORMAT)
        .map_err(|err| ExportError::Format(format!("bad local time {local:?}: {err}")))?;

    let diff = truncate_millis(utc)?.naive_utc() - local;
    if diff.num_milliseconds() % 1000 != 0 {
        return Err(ExportError::Validation(format!("time difference is fractional: {diff}")));
    }
    let offset = i32::try_from(diff.num_seconds())
        .ok()
        .and_then(|secs| FixedOffset::west_opt(secs))
        .ok_or_else(|| ExportError::Validation(format!("time difference out of range: {diff}")))?;

    let day: u32 = weekday
        .parse()
        .map_err(|_| ExportError::Format(format!("bad weekday {weekday:?}")))?;
    let actual = local.weekday().num_days_from_sunday();
    if day != actual {
        return Err(ExportError::Validation(format!(
            "inconsistent weekday: {} and {}",
            weekday_name(day),
            weekday_name(actual)
        )));
    }

    Ok((utc, offset))
}

pub(crate) fn encode(visit: &Visit, zone: FixedOffset) -> Result<Vec<String>, ExportError> {
    let time = visit
        .visit_time
        .ok_or_else(|| ExportError::Validation("analysis visit has no visit time".to_string()))?;
    let transition = visit.transition.name().ok_or_else(|| {
        ExportError::Validation(format!("transition {} has no core type name", visit.transition.0))
    })?;

    let host = Url::parse(&visit.url)
        .map(|url| url_hostname(&url))
        .unwrap_or_default();
    let domain = if host.is_empty() {
        String::new()
    } else {
        registrable_domain(&host).unwrap_or_default()
    };
    let local = truncate_millis(time)?.with_timezone(&zone).naive_local();

    Ok(vec![
        visit.url.clone(),
        host,
        domain,
        timefmt::format(time, Unit::Milli, Epoch::Unix),
        local.format(LOCAL_FORMAT).to_string(),
        local.weekday().num_days_from_sunday().to_string(),
        transition.to_string(),
        visit.page_title.clone(),
    ])
}

fn url_hostname(url: &Url) -> String {
    match url.host() {
        Some(Host::Ipv6(addr)) => addr.to_string(),
        Some(host) => host.to_string(),
        None => String::new(),
    }
}

fn registrable_domain(host: &str) -> Option<String> {
    let host = host.to_lowercase();
    psl::domain(host.as_bytes())
        .and_then(|d| std::str::from_utf8(d.as_bytes()).ok())
        .map(|s| s.to_string())
}

fn truncate_millis(t: DateTime<Utc>) -> Result<DateTime<Utc>, ExportError> {
    DateTime::from_timestamp_millis(t.timestamp_millis())
        .ok_or_else(|| ExportError::Format(format!("visit time out of range: {t}")))
}

fn weekday_name(day: u32) -> String {
    WEEKDAYS
        .get(day as usize)
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("weekday({day})"))
}
