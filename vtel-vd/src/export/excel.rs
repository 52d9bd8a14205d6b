//! Spreadsheet export: a single worksheet with a bold header row
//!
//! Timestamps are real date-time cells. Absent values are left as empty
//! cells.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use vtel_common::db::VehicleSample;
use vtel_common::{Error, Result};

use super::EXPORT_COLUMNS;

const SHEET_NAME: &str = "vehicle_data";
const TIMESTAMP_FORMAT: &str = "yyyy-mm-dd hh:mm:ss.000";
const TIMESTAMP_COLUMN_WIDTH: f64 = 24.0;

pub fn write_excel(path: &Path, samples: &[VehicleSample]) -> Result<()> {
    let mut workbook = build_workbook(samples)
        .map_err(|e| Error::Export(format!("build workbook: {}", e)))?;
    workbook
        .save(path)
        .map_err(|e| Error::Export(format!("write XLSX {}: {}", path.display(), e)))
}

fn build_workbook(samples: &[VehicleSample]) -> std::result::Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let timestamp = Format::new().set_num_format(TIMESTAMP_FORMAT);

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    sheet.set_column_width(1, TIMESTAMP_COLUMN_WIDTH)?;

    for (col, name) in (0u16..).zip(EXPORT_COLUMNS) {
        sheet.write_string_with_format(0, col, name, &header)?;
    }

    for (i, sample) in samples.iter().enumerate() {
        let row = u32::try_from(i + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
        write_sample(sheet, row, sample, &timestamp)?;
    }

    Ok(workbook)
}

fn write_sample(
    sheet: &mut Worksheet,
    row: u32,
    sample: &VehicleSample,
    timestamp: &Format,
) -> std::result::Result<(), XlsxError> {
    sheet.write_number(row, 0, sample.id as f64)?;
    sheet.write_datetime_with_format(row, 1, &sample.timestamp, timestamp)?;
    if let Some(speed) = sample.speed {
        sheet.write_number(row, 2, speed as f64)?;
    }
    if let Some(odometer) = sample.odometer {
        sheet.write_number(row, 3, odometer)?;
    }
    if let Some(soc) = sample.soc {
        sheet.write_number(row, 4, soc as f64)?;
    }
    if let Some(elevation) = sample.elevation {
        sheet.write_number(row, 5, elevation as f64)?;
    }
    if let Some(shift_state) = &sample.shift_state {
        sheet.write_string(row, 6, shift_state.as_str())?;
    }
    sheet.write_number(row, 7, sample.vehicle_registration_id as f64)?;
    Ok(())
}
