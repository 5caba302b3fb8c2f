//! Instant codec for persisted timestamps.
//!
//! Every instant is stored as fixed-width RFC 3339 UTC text with microsecond
//! precision (`2025-01-01T00:00:00.000000Z`). Fixed width means SQL string
//! comparison orders the same way as chronological comparison, so interval
//! filters can run inside SQLite. That only holds for four-digit years, so
//! instants outside 0000-9999 are refused at the edges.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

use crate::errors::{RefdataError, RefdataResult};

/// Years the fixed-width storage format can represent.
pub const STORABLE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// Whether `value` formats to fixed-width storage text.
pub fn is_storable(value: DateTime<Utc>) -> bool {
    STORABLE_YEARS.contains(&value.year())
}

fn storable(value: DateTime<Utc>, raw: impl ToString) -> RefdataResult<DateTime<Utc>> {
    if is_storable(value) {
        Ok(value)
    } else {
        Err(RefdataError::InvalidTimestamp {
            value: raw.to_string(),
        })
    }
}

/// Format an instant for storage.
pub fn format_ts(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Format an optional boundary; `None` is an open bound.
pub fn format_opt_ts(value: Option<DateTime<Utc>>) -> Option<String> {
    value.map(format_ts)
}

/// Parse a user- or store-supplied instant.
///
/// Accepts RFC 3339 with `Z` or an offset (normalised to UTC), a naive
/// datetime (taken as UTC), or a bare date (midnight UTC).
pub fn parse_ts(raw: &str) -> RefdataResult<DateTime<Utc>> {
    let value = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return storable(dt.with_timezone(&Utc), raw);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return storable(Utc.from_utc_datetime(&naive), raw);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return storable(Utc.from_utc_datetime(&midnight), raw);
        }
    }
    Err(RefdataError::InvalidTimestamp {
        value: raw.to_string(),
    })
}

/// Interpret a numeric epoch-seconds value (integer or fractional).
pub fn from_epoch_seconds(secs: f64) -> RefdataResult<DateTime<Utc>> {
    if !secs.is_finite() {
        return Err(RefdataError::InvalidTimestamp {
            value: secs.to_string(),
        });
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1_000_000_000.0).round() as u32;
    let value = DateTime::from_timestamp(whole as i64, nanos.min(999_999_999)).ok_or_else(|| {
        RefdataError::InvalidTimestamp {
            value: secs.to_string(),
        }
    })?;
    storable(value, secs)
}

/// Drop sub-microsecond precision so an instant survives a storage round-trip unchanged.
pub fn truncate_to_micros(value: DateTime<Utc>) -> DateTime<Utc> {
    let micros = value.timestamp_micros();
    DateTime::from_timestamp_micros(micros).unwrap_or(value)
}
