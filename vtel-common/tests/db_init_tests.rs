//! Tests for database initialization and schema constraints

use std::path::PathBuf;
use tempfile::TempDir;
use vtel_common::db::init::init_database;

fn temp_db_path(dir: &TempDir) -> PathBuf {
    dir.path().join("nested").join("vehicle_db.db")
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = temp_db_path(&dir);

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = TempDir::new().unwrap();
    let db_path = temp_db_path(&dir);

    let pool1 = init_database(&db_path).await.unwrap();
    sqlx::query("INSERT INTO vehicle_registrations (vehicle_id) VALUES ('car1')")
        .execute(&pool1)
        .await
        .unwrap();
    pool1.close().await;

    // Second open must keep existing rows
    let pool2 = init_database(&db_path).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vehicle_registrations")
        .fetch_one(&pool2)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_vehicle_id_is_unique() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&temp_db_path(&dir)).await.unwrap();

    sqlx::query("INSERT INTO vehicle_registrations (vehicle_id) VALUES ('car1')")
        .execute(&pool)
        .await
        .unwrap();
    let err = sqlx::query("INSERT INTO vehicle_registrations (vehicle_id) VALUES ('car1')")
        .execute(&pool)
        .await
        .unwrap_err();

    assert!(err.as_database_error().unwrap().is_unique_violation());
}

#[tokio::test]
async fn test_samples_require_existing_registration() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&temp_db_path(&dir)).await.unwrap();

    let err = sqlx::query(
        "INSERT INTO vehicle_samples (timestamp, vehicle_registration_id)
         VALUES ('2022-07-12 16:41:05.000000', 42)",
    )
    .execute(&pool)
    .await
    .unwrap_err();

    assert!(err.as_database_error().unwrap().is_foreign_key_violation());
}

#[tokio::test]
async fn test_negative_speed_rejected_by_schema() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&temp_db_path(&dir)).await.unwrap();

    sqlx::query("INSERT INTO vehicle_registrations (vehicle_id) VALUES ('car1')")
        .execute(&pool)
        .await
        .unwrap();
    let result = sqlx::query(
        "INSERT INTO vehicle_samples (timestamp, speed, vehicle_registration_id)
         VALUES ('2022-07-12 16:41:05.000000', -1, 1)",
    )
    .execute(&pool)
    .await;

    assert!(result.is_err());
}
