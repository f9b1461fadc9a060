//! CF-convention time axis decoding.
//!
//! Gridfiles store time as `<unit> since <epoch>` floats. The ingestion
//! transform works in nanoseconds since the Unix epoch, so everything is
//! normalized to that here.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::{GridFileError, GridFileResult};

const NANOS_PER_SECOND: f64 = 1e9;

/// A parsed `units` attribute of a CF time variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeUnits {
    /// Length of one unit in nanoseconds
    pub scale_ns: f64,
    /// Reference epoch in nanoseconds since 1970-01-01T00:00:00Z
    pub epoch_ns: i64,
}

impl TimeUnits {
    /// Parse strings such as `seconds since 1970-01-01T00:00:00Z`.
    pub fn parse(units: &str) -> GridFileResult<Self> {
        let (unit, epoch) = units
            .split_once(" since ")
            .ok_or_else(|| GridFileError::InvalidTimeUnits(units.to_string()))?;

        let scale_ns = match unit.trim().to_lowercase().as_str() {
            "days" | "day" | "d" => 86_400.0 * NANOS_PER_SECOND,
            "hours" | "hour" | "h" => 3_600.0 * NANOS_PER_SECOND,
            "minutes" | "minute" | "min" => 60.0 * NANOS_PER_SECOND,
            "seconds" | "second" | "s" | "sec" => NANOS_PER_SECOND,
            "milliseconds" | "millisecond" | "ms" => 1e6,
            "microseconds" | "microsecond" | "us" => 1e3,
            "nanoseconds" | "nanosecond" | "ns" => 1.0,
            _ => return Err(GridFileError::InvalidTimeUnits(units.to_string())),
        };

        let epoch = parse_epoch(epoch.trim())
            .ok_or_else(|| GridFileError::InvalidTimeUnits(units.to_string()))?;
        let epoch_ns = epoch
            .timestamp_nanos_opt()
            .ok_or_else(|| GridFileError::InvalidTimeUnits(units.to_string()))?;

        Ok(Self { scale_ns, epoch_ns })
    }

    /// Convert a raw axis value into nanoseconds since the Unix epoch.
    pub fn to_nanos(&self, value: f64) -> GridFileResult<i64> {
        if !value.is_finite() {
            return Err(GridFileError::InvalidFormat(format!(
                "non-finite time value {}",
                value
            )));
        }
        let offset = (value * self.scale_ns).round();
        // i64::MAX as f64 rounds up to 2^63, which is itself out of range
        if offset < i64::MIN as f64 || offset >= i64::MAX as f64 {
            return Err(GridFileError::InvalidFormat(format!(
                "time value {} out of range",
                value
            )));
        }
        self.epoch_ns.checked_add(offset as i64).ok_or_else(|| {
            GridFileError::InvalidFormat(format!("time value {} out of range", value))
        })
    }
}

fn parse_epoch(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    let trimmed = text
        .trim_end_matches(" UTC")
        .trim_end_matches(" utc")
        .trim_end_matches('Z');

    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Convert nanoseconds since the Unix epoch to a UTC datetime.
pub fn nanos_to_datetime(ns: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_nanos(ns)
}
