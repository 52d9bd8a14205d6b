//! Record Store: persistence for vehicle registrations and samples
//!
//! Each call opens its own unit of work against the pool and returns plain
//! data; callers never hold connections or transactions across calls.

mod registrations;
mod samples;

use chrono::NaiveDateTime;
use sqlx::SqlitePool;

/// Handle to the shared database.
///
/// Cloning is cheap (the pool is reference counted); construct once at
/// startup and hand clones to each service.
#[derive(Clone)]
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Underlying pool, for shutdown and tests
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Inclusive timestamp bounds; either side may be open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl TimeRange {
    pub fn new(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        Self { start, end }
    }

    /// Unbounded on both sides
    pub fn all() -> Self {
        Self::default()
    }

    pub fn contains(&self, ts: &NaiveDateTime) -> bool {
        self.start.map_or(true, |s| *ts >= s) && self.end.map_or(true, |e| *ts <= e)
    }
}
