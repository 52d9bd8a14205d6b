//! JSON export: a pretty-printed array of sample objects

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use vtel_common::db::VehicleSample;
use vtel_common::{Error, Result};

use super::ExportRecord;

pub fn write_json(path: &Path, samples: &[VehicleSample]) -> Result<()> {
    let records: Vec<ExportRecord> = samples.iter().map(ExportRecord::from).collect();

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &records)
        .map_err(|e| Error::Export(format!("write JSON {}: {}", path.display(), e)))?;
    writer.flush()?;

    Ok(())
}
