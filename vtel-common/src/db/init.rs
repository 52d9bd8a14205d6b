//! Database initialization
//!
//! Opens (creating if needed) the SQLite file and ensures the schema exists.
//! Every statement is idempotent, so this runs on each startup.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// How long a writer waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Initialize database connection pool and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Pragmas set here apply to every pooled connection, not just the first
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create every table and index used by the services
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_vehicle_registrations_table(pool).await?;
    create_vehicle_samples_table(pool).await?;
    Ok(())
}

async fn create_vehicle_registrations_table(pool: &SqlitePool) -> Result<()> {
    // UNIQUE(vehicle_id) turns a racing duplicate registration into a
    // constraint violation instead of a second row
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS vehicle_registrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            vehicle_id TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_vehicle_samples_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS vehicle_samples (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            speed INTEGER CHECK (speed IS NULL OR speed >= 0),
            odometer REAL CHECK (odometer IS NULL OR odometer >= 0),
            soc INTEGER,
            elevation INTEGER,
            shift_state TEXT,
            vehicle_registration_id INTEGER NOT NULL
                REFERENCES vehicle_registrations(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_vehicle_samples_registration_timestamp
        ON vehicle_samples(vehicle_registration_id, timestamp)
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
