//! Timestamp utilities
//!
//! Source files carry timestamps in several textual shapes. Everything is
//! normalised to a naive UTC `NaiveDateTime`; offsets are applied on parse.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, TimeDelta, Timelike};

/// Column format used for persisted timestamps.
///
/// Fixed width so that text order in SQLite equals chronological order.
pub const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Fractional digits kept by [`STORAGE_FORMAT`]
pub const STORAGE_PRECISION: u16 = 6;

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp from source or query text.
///
/// Sub-microsecond digits are truncated so the result survives storage
/// unchanged. Returns `None` for blank or unrecognised input.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    parse_any(raw).map(|ts| ts.trunc_subsecs(STORAGE_PRECISION))
}

fn parse_any(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.naive_utc());
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Render a timestamp for storage / range comparison in SQLite
pub fn to_storage_text(ts: &NaiveDateTime) -> String {
    ts.format(STORAGE_FORMAT).to_string()
}

/// Smallest storable timestamp not earlier than `ts`.
///
/// Lower query bounds go through this so that truncation in
/// [`to_storage_text`] never admits a row earlier than the bound.
pub fn ceil_to_storage(ts: &NaiveDateTime) -> NaiveDateTime {
    let truncated = ts.trunc_subsecs(STORAGE_PRECISION);
    if truncated < *ts {
        truncated + TimeDelta::microseconds(1)
    } else {
        truncated
    }
}

/// Render a timestamp as ISO 8601 text.
///
/// Fractional seconds are written (as microseconds) only when present.
pub fn to_iso_text(ts: &NaiveDateTime) -> String {
    if ts.nanosecond() == 0 {
        ts.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        ts.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").unwrap()
    }

    #[test]
    fn test_parse_iso_without_offset() {
        assert_eq!(
            parse_timestamp("2022-07-12T16:41:05"),
            Some(ts("2022-07-12 16:41:05"))
        );
    }

    #[test]
    fn test_parse_space_separated_with_fraction() {
        assert_eq!(
            parse_timestamp("2022-07-12 16:41:05.250"),
            Some(ts("2022-07-12 16:41:05.250"))
        );
    }

    #[test]
    fn test_parse_zulu_and_offset_convert_to_utc() {
        assert_eq!(
            parse_timestamp("2025-08-23T12:00:00Z"),
            Some(ts("2025-08-23 12:00:00"))
        );
        assert_eq!(
            parse_timestamp("2025-08-23T14:00:00+02:00"),
            Some(ts("2025-08-23 12:00:00"))
        );
        assert_eq!(
            parse_timestamp("2025-08-23 14:00:00+02:00"),
            Some(ts("2025-08-23 12:00:00"))
        );
    }

    #[test]
    fn test_parse_truncates_to_microseconds() {
        let parsed = parse_timestamp("2023-01-01 00:00:00.1234569").unwrap();
        assert_eq!(parsed, ts("2023-01-01 00:00:00.123456"));
        assert_eq!(to_storage_text(&parsed), "2023-01-01 00:00:00.123456");

        // Stored text parses back to the same value
        assert_eq!(parse_timestamp(&to_storage_text(&parsed)), Some(parsed));
    }

    #[test]
    fn test_ceil_to_storage() {
        let exact = ts("2023-01-01 00:00:00.123456");
        assert_eq!(ceil_to_storage(&exact), exact);
        assert_eq!(
            ceil_to_storage(&ts("2023-01-01 00:00:00.1234561")),
            ts("2023-01-01 00:00:00.123457")
        );
        assert_eq!(
            ceil_to_storage(&ts("2023-01-01 00:00:59.9999999")),
            ts("2023-01-01 00:01:00")
        );
    }

    #[test]
    fn test_parse_date_only_is_midnight() {
        assert_eq!(parse_timestamp("2022-07-12"), Some(ts("2022-07-12 00:00:00")));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("   "), None);
        assert_eq!(parse_timestamp("not-a-date"), None);
        assert_eq!(parse_timestamp("2022-13-40 10:00:00"), None);
    }

    #[test]
    fn test_storage_text_orders_chronologically() {
        let early = to_storage_text(&ts("2022-07-12 16:41:05"));
        let mid = to_storage_text(&ts("2022-07-12 16:41:05.5"));
        let late = to_storage_text(&ts("2022-07-12 16:41:06"));
        assert_eq!(early, "2022-07-12 16:41:05.000000");
        assert!(early < mid);
        assert!(mid < late);
    }

    #[test]
    fn test_iso_text() {
        assert_eq!(to_iso_text(&ts("2022-07-12 16:41:05")), "2022-07-12T16:41:05");
        assert_eq!(
            to_iso_text(&ts("2022-07-12 16:41:05.5")),
            "2022-07-12T16:41:05.500000"
        );
    }
}
