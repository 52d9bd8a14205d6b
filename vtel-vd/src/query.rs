//! Query Service: filtered, paginated sample listing

use serde::Serialize;
use tracing::debug;
use vtel_common::db::{VehicleRegistration, VehicleSample};
use vtel_common::{Error, Result};

use crate::pagination::PageRequest;
use crate::store::{RecordStore, TimeRange};

/// One page of samples plus the size of the full filtered set
#[derive(Debug, Clone, Serialize)]
pub struct SamplePage {
    pub count: i64,
    pub data: Vec<VehicleSample>,
}

#[derive(Clone)]
pub struct QueryService {
    store: RecordStore,
}

/// Resolve a business key, failing with [`Error::NotFound`] if unknown
pub(crate) async fn resolve_vehicle(store: &RecordStore, vehicle_id: &str) -> Result<VehicleRegistration> {
    store
        .find_registration(vehicle_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Selected Vehicle ID not found: {}", vehicle_id)))
}

impl QueryService {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Samples of one vehicle, ascending by timestamp.
    ///
    /// An unknown `vehicle_id` fails before any sample query is issued.
    pub async fn list_samples(
        &self,
        vehicle_id: &str,
        range: &TimeRange,
        page: PageRequest,
    ) -> Result<SamplePage> {
        let registration = resolve_vehicle(&self.store, vehicle_id).await?;

        let (count, data) = self
            .store
            .query_samples(registration.id, range, page.offset(), page.limit())
            .await?;

        debug!(
            "Vehicle '{}': {} matching samples, returning {} (page {}, limit {})",
            vehicle_id,
            count,
            data.len(),
            page.page(),
            page.limit()
        );

        Ok(SamplePage { count, data })
    }

    /// One sample by its internal id
    pub async fn get_sample(&self, id: i64) -> Result<VehicleSample> {
        self.store
            .get_sample_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Vehicle record not found: {}", id)))
    }

    /// Every registered business key, in registration order
    pub async fn vehicle_ids(&self) -> Result<Vec<String>> {
        let registrations = self.store.get_all_registrations().await?;
        Ok(registrations.into_iter().map(|r| r.vehicle_id).collect())
    }
}
