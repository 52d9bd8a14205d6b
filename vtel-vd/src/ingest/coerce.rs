//! Per-field coercion of raw CSV text into typed sample values
//!
//! Each function is pure: raw text in, typed optional value out. A blank
//! cell or a missing-value marker yields `None`, never a zero.

use chrono::NaiveDateTime;
use thiserror::Error;
use vtel_common::db::SampleReading;
use vtel_common::time::parse_timestamp;

use super::parser::RawRow;

/// Cell contents treated as "no value"
pub const MISSING_MARKERS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "NULL", "null", "None", "<NA>", "#N/A",
];

/// Why a single cell could not be coerced
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoerceError {
    #[error("value is required")]
    Missing,

    #[error("'{0}' is not a valid timestamp")]
    Timestamp(String),

    #[error("'{0}' is not a number")]
    NotNumeric(String),

    #[error("'{0}' is out of range")]
    OutOfRange(String),

    #[error("'{0}' must not be negative")]
    Negative(String),
}

/// Coercion failure tied to the column it happened in
#[derive(Debug, Clone, Error, PartialEq)]
#[error("column '{column}': {error}")]
pub struct FieldError {
    pub column: &'static str,
    pub error: CoerceError,
}

/// Trimmed cell text, or `None` when the cell counts as missing
pub fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty() && !MISSING_MARKERS.contains(s))
}

pub fn coerce_timestamp(raw: Option<&str>) -> Result<NaiveDateTime, CoerceError> {
    let value = present(raw).ok_or(CoerceError::Missing)?;
    parse_timestamp(value).ok_or_else(|| CoerceError::Timestamp(value.to_string()))
}

/// Integer text as-is; decimal text truncates toward zero
pub fn coerce_int(raw: Option<&str>) -> Result<Option<i64>, CoerceError> {
    let Some(value) = present(raw) else {
        return Ok(None);
    };

    if let Ok(i) = value.parse::<i64>() {
        return Ok(Some(i));
    }

    let f: f64 = value
        .parse()
        .map_err(|_| CoerceError::NotNumeric(value.to_string()))?;
    let truncated = f.trunc();
    // i64::MAX as f64 rounds up to 2^63, which itself does not fit
    if !truncated.is_finite() || truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return Err(CoerceError::OutOfRange(value.to_string()));
    }

    Ok(Some(truncated as i64))
}

pub fn coerce_float(raw: Option<&str>) -> Result<Option<f64>, CoerceError> {
    let Some(value) = present(raw) else {
        return Ok(None);
    };

    let f: f64 = value
        .parse()
        .map_err(|_| CoerceError::NotNumeric(value.to_string()))?;
    if !f.is_finite() {
        return Err(CoerceError::OutOfRange(value.to_string()));
    }

    Ok(Some(f))
}

pub fn coerce_text(raw: Option<&str>) -> Option<String> {
    present(raw).map(str::to_string)
}

fn field<T>(column: &'static str, result: Result<T, CoerceError>) -> Result<T, FieldError> {
    result.map_err(|error| FieldError { column, error })
}

fn non_negative<T: PartialOrd + Default>(
    column: &'static str,
    value: Option<T>,
    raw: Option<&str>,
) -> Result<Option<T>, FieldError> {
    match value {
        Some(v) if v < T::default() => Err(FieldError {
            column,
            error: CoerceError::Negative(raw.unwrap_or_default().trim().to_string()),
        }),
        other => Ok(other),
    }
}

/// Coerce one raw row into a typed reading
pub fn coerce_row(row: &RawRow) -> Result<SampleReading, FieldError> {
    let timestamp = field("timestamp", coerce_timestamp(row.timestamp.as_deref()))?;

    let speed = field("speed", coerce_int(row.speed.as_deref()))?;
    let speed = non_negative("speed", speed, row.speed.as_deref())?;

    let odometer = field("odometer", coerce_float(row.odometer.as_deref()))?;
    let odometer = non_negative("odometer", odometer, row.odometer.as_deref())?;

    Ok(SampleReading {
        timestamp,
        speed,
        odometer,
        soc: field("soc", coerce_int(row.soc.as_deref()))?,
        elevation: field("elevation", coerce_int(row.elevation.as_deref()))?,
        shift_state: coerce_text(row.shift_state.as_deref()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(timestamp: &str) -> RawRow {
        RawRow {
            line: 2,
            timestamp: Some(timestamp.to_string()),
            ..RawRow::default()
        }
    }

    #[test]
    fn test_blank_and_markers_are_missing() {
        assert_eq!(coerce_int(None), Ok(None));
        assert_eq!(coerce_int(Some("")), Ok(None));
        assert_eq!(coerce_int(Some("   ")), Ok(None));
        assert_eq!(coerce_int(Some("NaN")), Ok(None));
        assert_eq!(coerce_float(Some("NA")), Ok(None));
        assert_eq!(coerce_text(Some("null")), None);
    }

    #[test]
    fn test_int_parses_and_truncates() {
        assert_eq!(coerce_int(Some("50")), Ok(Some(50)));
        assert_eq!(coerce_int(Some(" -12 ")), Ok(Some(-12)));
        assert_eq!(coerce_int(Some("50.0")), Ok(Some(50)));
        assert_eq!(coerce_int(Some("50.9")), Ok(Some(50)));
        assert_eq!(coerce_int(Some("-3.7")), Ok(Some(-3)));
    }

    #[test]
    fn test_int_rejects_garbage_and_overflow() {
        assert_eq!(
            coerce_int(Some("fast")),
            Err(CoerceError::NotNumeric("fast".to_string()))
        );
        assert_eq!(
            coerce_int(Some("1e30")),
            Err(CoerceError::OutOfRange("1e30".to_string()))
        );
        assert_eq!(
            coerce_int(Some("inf")),
            Err(CoerceError::OutOfRange("inf".to_string()))
        );
    }

    #[test]
    fn test_float() {
        assert_eq!(coerce_float(Some("1000.5")), Ok(Some(1000.5)));
        assert_eq!(coerce_float(Some("7")), Ok(Some(7.0)));
        assert!(coerce_float(Some("abc")).is_err());
    }

    #[test]
    fn test_text_is_trimmed() {
        assert_eq!(coerce_text(Some(" D ")), Some("D".to_string()));
    }

    #[test]
    fn test_timestamp_required() {
        assert_eq!(coerce_timestamp(None), Err(CoerceError::Missing));
        assert_eq!(coerce_timestamp(Some("")), Err(CoerceError::Missing));
        assert_eq!(
            coerce_timestamp(Some("yesterday")),
            Err(CoerceError::Timestamp("yesterday".to_string()))
        );
    }

    #[test]
    fn test_row_with_only_timestamp() {
        let reading = coerce_row(&row("2022-07-12T16:41:05")).unwrap();
        assert_eq!(reading.speed, None);
        assert_eq!(reading.odometer, None);
        assert_eq!(reading.soc, None);
        assert_eq!(reading.elevation, None);
        assert_eq!(reading.shift_state, None);
    }

    #[test]
    fn test_full_row() {
        let raw = RawRow {
            line: 2,
            timestamp: Some("2022-07-12 16:41:05".to_string()),
            speed: Some("50".to_string()),
            odometer: Some("1000.5".to_string()),
            soc: Some("-5".to_string()),
            elevation: Some("-20".to_string()),
            shift_state: Some("D".to_string()),
        };
        let reading = coerce_row(&raw).unwrap();
        assert_eq!(reading.speed, Some(50));
        assert_eq!(reading.odometer, Some(1000.5));
        // soc and elevation have no range restriction
        assert_eq!(reading.soc, Some(-5));
        assert_eq!(reading.elevation, Some(-20));
        assert_eq!(reading.shift_state.as_deref(), Some("D"));
    }

    #[test]
    fn test_negative_speed_and_odometer_rejected() {
        let mut raw = row("2022-07-12 16:41:05");
        raw.speed = Some("-1".to_string());
        let err = coerce_row(&raw).unwrap_err();
        assert_eq!(err.column, "speed");
        assert_eq!(err.error, CoerceError::Negative("-1".to_string()));

        let mut raw = row("2022-07-12 16:41:05");
        raw.odometer = Some("-0.5".to_string());
        assert_eq!(coerce_row(&raw).unwrap_err().column, "odometer");
    }

    #[test]
    fn test_bad_timestamp_names_column() {
        let err = coerce_row(&row("12/07/2022 noon")).unwrap_err();
        assert_eq!(err.column, "timestamp");
        assert!(err.to_string().contains("12/07/2022 noon"));
    }
}
