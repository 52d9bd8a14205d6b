//! Vehicle registration persistence

use std::collections::HashSet;

use tracing::debug;
use vtel_common::db::VehicleRegistration;
use vtel_common::{Error, Result};

use super::RecordStore;

const INSERT_REGISTRATION: &str = "INSERT INTO vehicle_registrations (vehicle_id) VALUES (?)";

impl RecordStore {
    /// Register one vehicle.
    ///
    /// Fails with [`Error::Conflict`] if `vehicle_id` is already registered.
    pub async fn create_registration(&self, vehicle_id: &str) -> Result<VehicleRegistration> {
        let id = sqlx::query(INSERT_REGISTRATION)
            .bind(vehicle_id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::from_write(e, &format!("register vehicle '{}'", vehicle_id)))?
            .last_insert_rowid();

        Ok(VehicleRegistration {
            id,
            vehicle_id: vehicle_id.to_string(),
        })
    }

    /// Register many vehicles in one transaction.
    ///
    /// Output order matches input order. Any failure rolls back the whole
    /// batch, so no partial registrations become visible.
    pub async fn bulk_create_registrations(
        &self,
        vehicle_ids: &[String],
    ) -> Result<Vec<VehicleRegistration>> {
        if vehicle_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(vehicle_ids.len());

        for vehicle_id in vehicle_ids {
            let id = sqlx::query(INSERT_REGISTRATION)
                .bind(vehicle_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| Error::from_write(e, &format!("register vehicle '{}'", vehicle_id)))?
                .last_insert_rowid();

            created.push(VehicleRegistration {
                id,
                vehicle_id: vehicle_id.clone(),
            });
        }

        tx.commit().await?;
        debug!("Registered {} vehicles", created.len());

        Ok(created)
    }

    /// All registered business keys
    pub async fn get_registration_ids(&self) -> Result<HashSet<String>> {
        let ids: Vec<String> = sqlx::query_scalar("SELECT vehicle_id FROM vehicle_registrations")
            .fetch_all(&self.pool)
            .await?;

        Ok(ids.into_iter().collect())
    }

    /// All registrations in creation order
    pub async fn get_all_registrations(&self) -> Result<Vec<VehicleRegistration>> {
        let registrations = sqlx::query_as::<_, VehicleRegistration>(
            "SELECT id, vehicle_id FROM vehicle_registrations ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }

    /// Resolve a business key to its registration
    pub async fn find_registration(&self, vehicle_id: &str) -> Result<Option<VehicleRegistration>> {
        let registration = sqlx::query_as::<_, VehicleRegistration>(
            "SELECT id, vehicle_id FROM vehicle_registrations WHERE vehicle_id = ?",
        )
        .bind(vehicle_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }
}
