//! Ingestion Pipeline
//!
//! Makes the store reflect the CSV files in the data directory without
//! reprocessing files already ingested:
//!
//! discover → skip known vehicles → parse → coerce → register vehicles (one
//! bulk call) → insert samples (one bulk call)
//!
//! Everything up to coercion is pure or read-only and completes before the
//! first write, so a malformed file aborts the run with nothing committed.
//! The two bulk writes are atomic separately, not together: if sample
//! insertion fails the new registrations stay, and a later run will skip
//! those files.

pub mod coerce;
pub mod parser;
pub mod scanner;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};
use vtel_common::db::{NewSample, SampleReading};
use vtel_common::{Error, Result};

use crate::store::RecordStore;
use scanner::SourceFile;

/// Outcome of one ingestion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Source files found in the data directory
    pub discovered: usize,
    /// Files skipped because their vehicle is already registered
    pub skipped: usize,
    /// Vehicles registered by this run
    pub registered: usize,
    /// Samples inserted by this run
    pub samples: usize,
}

/// A new source file with all of its rows coerced
#[derive(Debug, Clone)]
pub struct ParsedSource {
    pub vehicle_id: String,
    pub path: PathBuf,
    pub readings: Vec<SampleReading>,
}

/// In-memory result of the read-only stages, ready to commit
#[derive(Debug, Clone, Default)]
pub struct IngestPlan {
    pub discovered: usize,
    pub skipped: usize,
    pub sources: Vec<ParsedSource>,
}

impl IngestPlan {
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    fn report(&self) -> IngestReport {
        IngestReport {
            discovered: self.discovered,
            skipped: self.skipped,
            ..IngestReport::default()
        }
    }
}

/// Parse and coerce every row of one source file.
///
/// The first bad row fails the whole file.
pub fn read_source(source: &SourceFile) -> Result<Vec<SampleReading>> {
    parser::parse_source(&source.path)?
        .iter()
        .map(|row| {
            coerce::coerce_row(row)
                .map_err(|e| Error::ingestion(&source.path, format!("line {}: {}", row.line, e)))
        })
        .collect()
}

/// Run the read-only stages against `data_dir`.
///
/// Blocking: call from a blocking context.
pub fn prepare(data_dir: &Path, known: &HashSet<String>) -> Result<IngestPlan> {
    let discovered = scanner::discover_sources(data_dir)?;
    let discovered_count = discovered.len();
    let (fresh, skipped) = scanner::select_new(discovered, known);

    let sources = fresh
        .into_iter()
        .map(|source| {
            let readings = read_source(&source)?;
            Ok(ParsedSource {
                vehicle_id: source.vehicle_id,
                path: source.path,
                readings,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(IngestPlan {
        discovered: discovered_count,
        skipped,
        sources,
    })
}

/// Persist a plan: registrations first, then every sample in one batch.
///
/// A vehicle registered since the plan was built (e.g. by a concurrent run)
/// makes the registration batch fail with [`Error::Conflict`] and nothing is
/// written.
pub async fn commit(store: &RecordStore, plan: IngestPlan) -> Result<IngestReport> {
    let mut report = plan.report();
    if plan.is_empty() {
        return Ok(report);
    }

    let vehicle_ids: Vec<String> = plan.sources.iter().map(|s| s.vehicle_id.clone()).collect();
    let registrations = store.bulk_create_registrations(&vehicle_ids).await?;
    report.registered = registrations.len();

    let mut samples: Vec<NewSample> = Vec::new();
    for (source, registration) in plan.sources.into_iter().zip(&registrations) {
        if source.vehicle_id != registration.vehicle_id {
            return Err(Error::Internal(format!(
                "registration order mismatch: expected '{}', got '{}'",
                source.vehicle_id, registration.vehicle_id
            )));
        }
        samples.extend(source.readings.into_iter().map(|r| r.attach(registration.id)));
    }

    let persisted = store.bulk_create_samples(samples).await.map_err(|e| {
        warn!(
            "Sample insertion failed after registering {} vehicles: {}",
            registrations.len(),
            e
        );
        e
    })?;
    report.samples = persisted.len();

    Ok(report)
}

/// Ingestion bound to a store and a data directory
#[derive(Clone)]
pub struct IngestionPipeline {
    store: RecordStore,
    data_dir: PathBuf,
}

impl IngestionPipeline {
    pub fn new(store: RecordStore, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Ingest every new source file.
    ///
    /// A run with nothing new is a no-op, not an error.
    pub async fn run(&self) -> Result<IngestReport> {
        let known = self.store.get_registration_ids().await?;
        let data_dir = self.data_dir.clone();

        let plan = tokio::task::spawn_blocking(move || prepare(&data_dir, &known))
            .await
            .map_err(|e| Error::Internal(format!("ingestion task failed: {}", e)))??;

        if plan.is_empty() {
            info!(
                "Ingestion: no new source files in {} ({} discovered, {} already registered)",
                self.data_dir.display(),
                plan.discovered,
                plan.skipped
            );
            return Ok(plan.report());
        }

        let report = commit(&self.store, plan).await?;
        info!(
            "Ingestion complete: {} discovered, {} skipped, {} vehicles registered, {} samples",
            report.discovered, report.skipped, report.registered, report.samples
        );

        Ok(report)
    }
}
