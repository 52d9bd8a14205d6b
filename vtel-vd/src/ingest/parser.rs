//! CSV reading for per-vehicle source files
//!
//! Produces raw (untyped) rows keyed by the known column names. Typing is
//! left to [`super::coerce`].

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use vtel_common::{Error, Result};

/// One data row with the known columns extracted; unknown columns are ignored
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line number in the source file
    pub line: u64,
    pub timestamp: Option<String>,
    pub speed: Option<String>,
    pub odometer: Option<String>,
    pub soc: Option<String>,
    pub elevation: Option<String>,
    pub shift_state: Option<String>,
}

/// Maps CSV column indices to sample fields
#[derive(Debug, Default)]
struct ColumnMap {
    timestamp: Option<usize>,
    speed: Option<usize>,
    odometer: Option<usize>,
    soc: Option<usize>,
    elevation: Option<usize>,
    shift_state: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> std::result::Result<Self, String> {
        let mut map = Self::default();

        for (i, header) in headers.iter().enumerate() {
            match header.trim().to_ascii_lowercase().as_str() {
                "timestamp" => map.timestamp = Some(i),
                "speed" => map.speed = Some(i),
                "odometer" => map.odometer = Some(i),
                "soc" => map.soc = Some(i),
                "elevation" => map.elevation = Some(i),
                "shift_state" => map.shift_state = Some(i),
                _ => {}
            }
        }

        if map.timestamp.is_none() {
            return Err("missing required 'timestamp' column".to_string());
        }

        Ok(map)
    }

    fn extract(&self, record: &csv::StringRecord) -> RawRow {
        let get = |idx: Option<usize>| idx.and_then(|i| record.get(i)).map(str::to_string);

        RawRow {
            line: record.position().map_or(0, |p| p.line()),
            timestamp: get(self.timestamp),
            speed: get(self.speed),
            odometer: get(self.odometer),
            soc: get(self.soc),
            elevation: get(self.elevation),
            shift_state: get(self.shift_state),
        }
    }
}

/// Read every row from CSV text.
///
/// `origin` names the source in error messages.
pub fn parse_reader<R: Read>(reader: R, origin: &Path) -> Result<Vec<RawRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // short rows leave trailing fields missing
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| Error::ingestion(origin, format!("cannot read CSV header: {}", e)))?
        .clone();
    let columns = ColumnMap::from_headers(&headers).map_err(|reason| Error::ingestion(origin, reason))?;

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(|e| Error::ingestion(origin, format!("malformed CSV: {}", e)))?;
        rows.push(columns.extract(&record));
    }

    Ok(rows)
}

/// Open and read one source file
pub fn parse_source(path: &Path) -> Result<Vec<RawRow>> {
    let file = File::open(path).map_err(|e| Error::ingestion(path, format!("cannot open: {}", e)))?;
    parse_reader(BufReader::new(file), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(input: &str) -> Result<Vec<RawRow>> {
        parse_reader(Cursor::new(input), Path::new("test.csv"))
    }

    #[test]
    fn test_all_columns() {
        let rows = parse(
            "timestamp,speed,odometer,soc,elevation,shift_state\n\
             2022-07-12 16:41:05,50,1000.5,80,200,D\n",
        )
        .unwrap();

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.line, 2);
        assert_eq!(row.timestamp.as_deref(), Some("2022-07-12 16:41:05"));
        assert_eq!(row.speed.as_deref(), Some("50"));
        assert_eq!(row.odometer.as_deref(), Some("1000.5"));
        assert_eq!(row.soc.as_deref(), Some("80"));
        assert_eq!(row.elevation.as_deref(), Some("200"));
        assert_eq!(row.shift_state.as_deref(), Some("D"));
    }

    #[test]
    fn test_optional_columns_may_be_absent_and_reordered() {
        let rows = parse("speed,Timestamp,extra\n60,2022-07-12 16:41:05,x\n").unwrap();

        assert_eq!(rows[0].speed.as_deref(), Some("60"));
        assert_eq!(rows[0].timestamp.as_deref(), Some("2022-07-12 16:41:05"));
        assert_eq!(rows[0].odometer, None);
        assert_eq!(rows[0].shift_state, None);
    }

    #[test]
    fn test_short_row_leaves_trailing_fields_missing() {
        let rows = parse("timestamp,speed,shift_state\n2022-07-12 16:41:05,50\n").unwrap();
        assert_eq!(rows[0].speed.as_deref(), Some("50"));
        assert_eq!(rows[0].shift_state, None);
    }

    #[test]
    fn test_missing_timestamp_column_is_fatal() {
        let err = parse("speed,soc\n50,80\n").unwrap_err();
        assert!(matches!(err, Error::Ingestion { .. }));
        assert!(err.to_string().contains("timestamp"));
    }

    #[test]
    fn test_empty_input_is_fatal() {
        assert!(parse("").is_err());
    }

    #[test]
    fn test_header_only_has_no_rows() {
        assert!(parse("timestamp,speed\n").unwrap().is_empty());
    }
}
