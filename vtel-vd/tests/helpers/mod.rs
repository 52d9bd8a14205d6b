//! Shared fixtures for vtel-vd integration tests
#![allow(dead_code)]

use std::path::PathBuf;

use chrono::NaiveDateTime;
use tempfile::TempDir;
use vtel_common::db::init_database;
use vtel_vd::store::RecordStore;
use vtel_vd::AppState;

pub const HEADER: &str = "timestamp,speed,odometer,soc,elevation,shift_state";

/// Temp directory holding a fresh database, a data dir and an exports dir
pub struct TestEnv {
    pub dir: TempDir,
    pub store: RecordStore,
}

impl TestEnv {
    pub async fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let pool = init_database(&dir.path().join("vehicle_db.db"))
            .await
            .expect("init database");
        std::fs::create_dir_all(dir.path().join("data")).expect("create data dir");

        Self {
            dir,
            store: RecordStore::new(pool),
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.dir.path().join("exports")
    }

    /// Write `<file_name>` into the data dir with `rows` under the standard header
    pub fn write_source(&self, file_name: &str, rows: &[&str]) -> PathBuf {
        let mut content = String::from(HEADER);
        for row in rows {
            content.push('\n');
            content.push_str(row);
        }
        content.push('\n');
        self.write_raw(file_name, &content)
    }

    pub fn write_raw(&self, file_name: &str, content: &str) -> PathBuf {
        let path = self.data_dir().join(file_name);
        std::fs::write(&path, content).expect("write source file");
        path
    }

    pub fn state(&self) -> AppState {
        AppState::new(self.store.clone(), self.data_dir(), self.exports_dir())
    }

    pub async fn sample_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM vehicle_samples")
            .fetch_one(self.store.pool())
            .await
            .expect("count samples")
    }

    pub async fn registration_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM vehicle_registrations")
            .fetch_one(self.store.pool())
            .await
            .expect("count registrations")
    }
}

pub fn ts(text: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").expect("valid test timestamp")
}
