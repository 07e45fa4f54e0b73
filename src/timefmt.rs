//! # Time Format Module
//!
//! Conversions between integer counts since an epoch and absolute UTC
//! timestamps. Counts may carry a decimal fraction (`1384634958041.754`)
//! holding sub-unit precision down to the nanosecond.

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Seconds between 1601-01-01 and 1970-01-01.
const WINDOWS_TO_UNIX_SECS: i64 = 11_644_473_600;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeFmtError {
    #[error("invalid timestamp: {0:?}")]
    Invalid(String),
    #[error("timestamp out of range: {0}")]
    OutOfRange(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Epoch {
    /// 1970-01-01 00:00:00 UTC
    Unix,
    /// 1601-01-01 00:00:00 UTC
    Windows,
}

impl Epoch {
    fn unix_offset_secs(self) -> i64 {
        match self {
            Epoch::Unix => 0,
            Epoch::Windows => -WINDOWS_TO_UNIX_SECS,
        }
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Epoch::Unix => f.write_str("unix"),
            Epoch::Windows => f.write_str("windows"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Sec,
    Milli,
    Micro,
    Nano,
}

impl Unit {
    /// Decimal digits of sub-second precision the unit itself carries.
    pub fn digits(self) -> u32 {
        match self {
            Unit::Sec => 0,
            Unit::Milli => 3,
            Unit::Micro => 6,
            Unit::Nano => 9,
        }
    }

    fn per_second(self) -> i64 {
        10i64.pow(self.digits())
    }

    fn nanos_per_unit(self) -> i64 {
        10i64.pow(9 - self.digits())
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Sec => f.write_str("sec"),
            Unit::Milli => f.write_str("milli"),
            Unit::Micro => f.write_str("micro"),
            Unit::Nano => f.write_str("nano"),
        }
    }
}

/// Build a timestamp from `n` units since `epoch` plus `nsec` nanoseconds.
///
/// Negative counts lie before the epoch; `nsec` always counts forward, so
/// this inverts `to_int`.
pub fn from_int(n: i64, nsec: i64, unit: Unit, epoch: Epoch) -> Result<DateTime<Utc>, TimeFmtError> {
    let per_second = unit.per_second();
    let secs = n
        .div_euclid(per_second)
        .checked_add(epoch.unix_offset_secs())
        .ok_or(TimeFmtError::OutOfRange(n))?;
    let nanos = n.rem_euclid(per_second) * unit.nanos_per_unit() + nsec;
    let extra_secs = nanos.div_euclid(1_000_000_000);
    let nanos = nanos.rem_euclid(1_000_000_000) as u32;
    DateTime::from_timestamp(secs + extra_secs, nanos).ok_or(TimeFmtError::OutOfRange(n))
}

/// Split a timestamp into whole units since `epoch` and the nanosecond
/// remainder below one unit.
pub fn to_int(t: DateTime<Utc>, unit: Unit, epoch: Epoch) -> (i64, i64) {
    let secs = i128::from(t.timestamp()) - i128::from(epoch.unix_offset_secs());
    let total = secs * 1_000_000_000 + i128::from(t.timestamp_subsec_nanos());
    let nanos_per_unit = i128::from(unit.nanos_per_unit());
    (
        total.div_euclid(nanos_per_unit) as i64,
        total.rem_euclid(nanos_per_unit) as i64,
    )
}

/// Parse a count such as `13149893660345543` or `1384634958041.754`.
///
/// Fraction digits finer than a nanosecond are dropped.
pub fn parse(s: &str, unit: Unit, epoch: Epoch) -> Result<DateTime<Utc>, TimeFmtError> {
    let (whole, nsec) = split_count(s, unit)?;
    from_int(whole, nsec, unit, epoch)
}

/// Split a count into whole units and the nanoseconds its fraction adds.
pub fn split_count(s: &str, unit: Unit) -> Result<(i64, i64), TimeFmtError> {
    let invalid = || TimeFmtError::Invalid(s.to_string());
    let (whole, frac) = match s.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (s, None),
    };
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit() || b == b'-') {
        return Err(invalid());
    }
    let whole: i64 = whole.parse().map_err(|_| invalid())?;

    let mut nsec = 0i64;
    if let Some(frac) = frac {
        if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let places = (9 - unit.digits()) as usize;
        for i in 0..places {
            let digit = frac.as_bytes().get(i).map(|b| i64::from(b - b'0')).unwrap_or(0);
            nsec = nsec * 10 + digit;
        }
    }
    Ok((whole, nsec))
}

/// Render a timestamp as a count with a minimal decimal fraction.
pub fn format(t: DateTime<Utc>, unit: Unit, epoch: Epoch) -> String {
    let (n, nsec) = to_int(t, unit, epoch);
    let mut out = n.to_string();
    if nsec != 0 {
        let width = (9 - unit.digits()) as usize;
        let frac = format!("{nsec:0width$}");
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
    out
}
