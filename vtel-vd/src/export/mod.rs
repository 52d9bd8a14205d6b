//! Export Service: write all samples of a vehicle to a file
//!
//! Files land in the exports directory as `<vehicle_id>.<ext>` and overwrite
//! any earlier export of the same vehicle and format.

pub mod csv;
pub mod excel;
pub mod json;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use tracing::info;
use vtel_common::db::VehicleSample;
use vtel_common::time::to_iso_text;
use vtel_common::{Error, Result};

use crate::query::resolve_vehicle;
use crate::store::RecordStore;

/// Column order shared by every export format
pub const EXPORT_COLUMNS: [&str; 8] = [
    "id",
    "timestamp",
    "speed",
    "odometer",
    "soc",
    "elevation",
    "shift_state",
    "vehicle_registration_id",
];

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Json,
    Csv,
    Excel,
}

impl ExportFormat {
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Excel => "xlsx",
        }
    }

    pub const fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv",
            Self::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "JSON" => Ok(Self::Json),
            "CSV" => Ok(Self::Csv),
            "EXCEL" => Ok(Self::Excel),
            _ => Err(Error::Validation(format!(
                "Unsupported export type '{}' (expected JSON, CSV or EXCEL)",
                s
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "JSON"),
            Self::Csv => write!(f, "CSV"),
            Self::Excel => write!(f, "EXCEL"),
        }
    }
}

/// Flat, text-timestamped view of a sample as written to export files
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRecord {
    pub id: i64,
    pub timestamp: String,
    pub speed: Option<i64>,
    pub odometer: Option<f64>,
    pub soc: Option<i64>,
    pub elevation: Option<i64>,
    pub shift_state: Option<String>,
    pub vehicle_registration_id: i64,
}

impl From<&VehicleSample> for ExportRecord {
    fn from(sample: &VehicleSample) -> Self {
        Self {
            id: sample.id,
            timestamp: to_iso_text(&sample.timestamp),
            speed: sample.speed,
            odometer: sample.odometer,
            soc: sample.soc,
            elevation: sample.elevation,
            shift_state: sample.shift_state.clone(),
            vehicle_registration_id: sample.vehicle_registration_id,
        }
    }
}

/// Reference to a finished export, for the caller to stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub path: PathBuf,
    /// Suggested download name
    pub file_name: String,
    pub content_type: &'static str,
}

/// Write `samples` to `path` in `format`. Blocking.
pub fn write_export(path: &Path, format: ExportFormat, samples: &[VehicleSample]) -> Result<()> {
    match format {
        ExportFormat::Json => json::write_json(path, samples),
        ExportFormat::Csv => csv::write_csv(path, samples),
        ExportFormat::Excel => excel::write_excel(path, samples),
    }
}

#[derive(Clone)]
pub struct ExportService {
    store: RecordStore,
    exports_dir: PathBuf,
}

impl ExportService {
    pub fn new(store: RecordStore, exports_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            exports_dir: exports_dir.into(),
        }
    }

    pub fn exports_dir(&self) -> &Path {
        &self.exports_dir
    }

    /// Export every sample of `vehicle_id`, in insertion order.
    ///
    /// Fails with [`Error::NotFound`] for an unknown vehicle. The exports
    /// directory is created if missing.
    pub async fn export(&self, vehicle_id: &str, format: ExportFormat) -> Result<ExportedFile> {
        let registration = resolve_vehicle(&self.store, vehicle_id).await?;
        let samples = self.store.samples_for_registration(registration.id).await?;

        let file_name = format!("{}.{}", registration.vehicle_id, format.extension());
        let path = self.exports_dir.join(&file_name);
        let row_count = samples.len();

        let exports_dir = self.exports_dir.clone();
        let target = path.clone();
        tokio::task::spawn_blocking(move || {
            std::fs::create_dir_all(&exports_dir)?;
            write_export(&target, format, &samples)
        })
        .await
        .map_err(|e| Error::Internal(format!("export task failed: {}", e)))??;

        info!(
            "Exported {} samples of '{}' as {} to {}",
            row_count,
            vehicle_id,
            format,
            path.display()
        );

        Ok(ExportedFile {
            path,
            file_name,
            content_type: format.content_type(),
        })
    }
}
