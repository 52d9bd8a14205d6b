//! CSV export: header row plus one row per sample

use std::path::Path;

use vtel_common::db::VehicleSample;
use vtel_common::{Error, Result};

use super::{ExportRecord, EXPORT_COLUMNS};

pub fn write_csv(path: &Path, samples: &[VehicleSample]) -> Result<()> {
    let csv_err = |e: ::csv::Error| Error::Export(format!("write CSV {}: {}", path.display(), e));

    // Header written by hand so an empty export still carries it
    let mut writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_err)?;

    writer.write_record(EXPORT_COLUMNS).map_err(csv_err)?;
    for sample in samples {
        writer.serialize(ExportRecord::from(sample)).map_err(csv_err)?;
    }
    writer.flush()?;

    Ok(())
}
