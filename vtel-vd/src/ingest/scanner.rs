//! Source file discovery
//!
//! Each `*.csv` file directly inside the data directory is one candidate
//! vehicle; its file stem is the vehicle's business key.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use vtel_common::{Error, Result};
use walkdir::WalkDir;

/// One candidate vehicle file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// File name without extension
    pub vehicle_id: String,
    pub path: PathBuf,
}

impl SourceFile {
    /// Build from a path, or `None` if it is not a usable source file name
    pub fn from_path(path: &Path) -> Option<Self> {
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if !is_csv {
            return None;
        }

        let vehicle_id = path.file_stem()?.to_str()?.to_string();
        if vehicle_id.is_empty() {
            return None;
        }

        Some(Self {
            vehicle_id,
            path: path.to_path_buf(),
        })
    }
}

/// List source files in `data_dir`, sorted by file name.
///
/// The directory is not descended into. A missing or unreadable directory is
/// a fatal ingestion error.
pub fn discover_sources(data_dir: &Path) -> Result<Vec<SourceFile>> {
    if !data_dir.is_dir() {
        return Err(Error::ingestion(
            data_dir,
            "source directory does not exist or is not a directory",
        ));
    }

    let walker = WalkDir::new(data_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    let mut sources = Vec::new();
    for entry in walker {
        let entry = entry
            .map_err(|e| Error::ingestion(data_dir, format!("cannot read source directory: {}", e)))?;

        if !entry.file_type().is_file() {
            continue;
        }

        match SourceFile::from_path(entry.path()) {
            Some(source) => sources.push(source),
            None => debug!("Ignoring non-source file: {}", entry.path().display()),
        }
    }

    Ok(sources)
}

/// Drop sources whose vehicle is already registered.
///
/// Returns the new sources (in discovery order) and the number skipped. Two
/// files mapping to the same business key (e.g. `car1.csv` and `car1.CSV`)
/// keep only the first.
pub fn select_new(discovered: Vec<SourceFile>, known: &HashSet<String>) -> (Vec<SourceFile>, usize) {
    let mut seen = HashSet::new();
    let mut fresh = Vec::new();
    let mut skipped = 0;

    for source in discovered {
        if known.contains(&source.vehicle_id) {
            debug!("Skipping already registered vehicle '{}'", source.vehicle_id);
            skipped += 1;
        } else if !seen.insert(source.vehicle_id.clone()) {
            warn!(
                "Skipping {}: vehicle '{}' already provided by another file",
                source.path.display(),
                source.vehicle_id
            );
            skipped += 1;
        } else {
            fresh.push(source);
        }
    }

    (fresh, skipped)
}
