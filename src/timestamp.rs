// ⏰ Timestamp Normalizer
// Epoch numbers and ISO-8601 variants → canonical UTC instant

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Epoch values above this are milliseconds, everything else is seconds.
pub const EPOCH_MS_THRESHOLD: f64 = 1e12;

/// String layouts, tried in order. The flag marks layouts carrying an explicit offset.
///
/// Order matters: the first layout that accepts the input wins.
const LAYOUTS: [(&str, bool); 5] = [
    ("%Y-%m-%dT%H:%M:%S%.f%z", true), // 2012-10-24T09:00:00.000+09:00
    ("%Y-%m-%dT%H:%M:%S%z", true),    // 2012-10-24T09:00:00+09:00
    ("%Y-%m-%dT%H:%M:%S%.fZ", false), // 2012-10-24T09:00:00.000Z
    ("%Y-%m-%dT%H:%M:%SZ", false),    // 2012-10-24T09:00:00Z
    ("%Y-%m-%dT%H:%M:%S", false),     // 2012-10-24T09:00:00
];

/// Parse a JSON timestamp field (number or string) into a UTC instant.
///
/// Anything else (null, bool, object) or an unparseable string gives `None`.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_f64().and_then(from_epoch),
        Value::String(s) => parse_timestamp_str(s),
        _ => None,
    }
}

/// Parse a timestamp string.
///
/// Offsets present in the string are honored. A string without offset is
/// taken as UTC, never as local time. When no layout matches, the string is
/// tried as an integer epoch (same ms/s rule as numbers).
pub fn parse_timestamp_str(text: &str) -> Option<DateTime<Utc>> {
    for (layout, has_offset) in LAYOUTS {
        let parsed = if has_offset {
            DateTime::parse_from_str(text, layout)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        } else {
            NaiveDateTime::parse_from_str(text, layout)
                .ok()
                .map(|naive| naive.and_utc())
        };

        if parsed.is_some() {
            return parsed;
        }
    }

    // timestampMs stored as a string
    text.trim()
        .parse::<i64>()
        .ok()
        .and_then(|n| from_epoch(n as f64))
}

/// Convert an epoch value to UTC, treating values above 1e12 as milliseconds.
pub fn from_epoch(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }

    if value > EPOCH_MS_THRESHOLD {
        return DateTime::from_timestamp_millis(value.trunc() as i64);
    }

    let whole = value.floor();
    let nanos = ((value - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}

// ============================================================================
// DATE RANGE FILTER
// ============================================================================

/// Calendar-day filter in UTC: `after` is inclusive, `before` is exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub after: Option<NaiveDate>,
    pub before: Option<NaiveDate>,
}

impl DateRange {
    /// Build from optional `YYYY-MM-DD` strings (CLI flags)
    pub fn from_args(after: Option<&str>, before: Option<&str>) -> Result<Self> {
        Ok(DateRange {
            after: after.map(parse_day).transpose()?,
            before: before.map(parse_day).transpose()?,
        })
    }

    pub fn is_unbounded(&self) -> bool {
        self.after.is_none() && self.before.is_none()
    }

    /// Check whether an instant falls inside the range
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        if let Some(after) = self.after {
            if ts < day_start(after) {
                return false;
            }
        }

        if let Some(before) = self.before {
            if ts >= day_start(before) {
                return false;
            }
        }

        true
    }
}

/// Parse a `YYYY-MM-DD` day
pub fn parse_day(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .with_context(|| format!("Invalid date (expected YYYY-MM-DD): {}", text))
}

fn day_start(day: NaiveDate) -> DateTime<Utc> {
    day.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};
    use serde_json::json;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_fractional_with_offset() {
        let ts = parse_timestamp_str("2012-10-24T09:00:00.000+09:00").unwrap();
        assert_eq!(ts, utc(2012, 10, 24, 0, 0, 0));
    }

    #[test]
    fn test_whole_second_with_offset() {
        let ts = parse_timestamp_str("2012-10-24T09:00:00-02:00").unwrap();
        assert_eq!(ts, utc(2012, 10, 24, 11, 0, 0));
    }

    #[test]
    fn test_fractional_zulu() {
        let ts = parse_timestamp_str("2012-10-24T09:00:00.250Z").unwrap();
        assert_eq!(ts.second(), 0);
        assert_eq!(ts.timestamp_subsec_millis(), 250);
        assert_eq!(ts.hour(), 9);
    }

    #[test]
    fn test_whole_second_zulu() {
        assert_eq!(
            parse_timestamp_str("2023-05-01T00:00:00Z"),
            Some(utc(2023, 5, 1, 0, 0, 0))
        );
    }

    #[test]
    fn test_naive_is_utc() {
        assert_eq!(
            parse_timestamp_str("2012-10-24T09:00:00"),
            Some(utc(2012, 10, 24, 9, 0, 0))
        );
    }

    #[test]
    fn test_string_epoch_fallback() {
        assert_eq!(
            parse_timestamp_str("1682899200000"),
            Some(utc(2023, 5, 1, 0, 0, 0))
        );
        assert_eq!(
            parse_timestamp_str("1682899200"),
            Some(utc(2023, 5, 1, 0, 0, 0))
        );
    }

    #[test]
    fn test_garbage_string() {
        assert_eq!(parse_timestamp_str("yesterday"), None);
        assert_eq!(parse_timestamp_str(""), None);
    }

    #[test]
    fn test_numeric_ms_and_seconds_agree() {
        let seconds = parse_timestamp(&json!(1_682_899_200)).unwrap();
        let millis = parse_timestamp(&json!(1_682_899_200_000_i64)).unwrap();
        assert_eq!(seconds, millis);
        assert_eq!(seconds.year(), 2023);
    }

    #[test]
    fn test_threshold_boundary_is_seconds() {
        // exactly 1e12 is still seconds (year ~33658)
        let ts = from_epoch(1e12).unwrap();
        assert!(ts.year() > 30000);
    }

    #[test]
    fn test_fractional_seconds() {
        let ts = from_epoch(1.5).unwrap();
        assert_eq!(ts.timestamp(), 1);
        assert_eq!(ts.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_non_timestamp_values() {
        assert_eq!(parse_timestamp(&json!(null)), None);
        assert_eq!(parse_timestamp(&json!(true)), None);
        assert_eq!(parse_timestamp(&json!({"t": 1})), None);
    }

    #[test]
    fn test_date_range_inclusive_start_exclusive_end() {
        let range = DateRange::from_args(Some("2024-01-01"), Some("2025-01-01")).unwrap();

        assert!(range.contains(utc(2024, 1, 1, 0, 0, 0)));
        assert!(range.contains(utc(2024, 12, 31, 23, 59, 59)));
        assert!(!range.contains(utc(2023, 12, 31, 23, 59, 59)));
        assert!(!range.contains(utc(2025, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn test_date_range_unbounded() {
        let range = DateRange::default();
        assert!(range.is_unbounded());
        assert!(range.contains(utc(1990, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn test_invalid_day() {
        assert!(DateRange::from_args(Some("2024/01/01"), None).is_err());
    }
}
