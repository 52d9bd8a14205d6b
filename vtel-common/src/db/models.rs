//! Database models

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One distinct vehicle, keyed by its source file name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct VehicleRegistration {
    pub id: i64,
    /// Business key: source file name without extension
    pub vehicle_id: String,
}

/// One persisted telemetry reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct VehicleSample {
    pub id: i64,
    pub timestamp: NaiveDateTime,
    pub speed: Option<i64>,
    pub odometer: Option<f64>,
    /// State of charge; no range is enforced
    pub soc: Option<i64>,
    pub elevation: Option<i64>,
    pub shift_state: Option<String>,
    pub vehicle_registration_id: i64,
}

/// Typed reading coerced from one source row, not yet linked to a vehicle
#[derive(Debug, Clone, PartialEq)]
pub struct SampleReading {
    pub timestamp: NaiveDateTime,
    pub speed: Option<i64>,
    pub odometer: Option<f64>,
    pub soc: Option<i64>,
    pub elevation: Option<i64>,
    pub shift_state: Option<String>,
}

impl SampleReading {
    /// Reading with only the required timestamp set
    pub fn at(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            speed: None,
            odometer: None,
            soc: None,
            elevation: None,
            shift_state: None,
        }
    }

    /// Link this reading to a persisted registration
    pub fn attach(self, vehicle_registration_id: i64) -> NewSample {
        NewSample {
            vehicle_registration_id,
            reading: self,
        }
    }
}

/// Sample awaiting insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewSample {
    pub vehicle_registration_id: i64,
    pub reading: SampleReading,
}

impl NewSample {
    /// Combine with the id assigned by the store
    pub fn into_persisted(self, id: i64) -> VehicleSample {
        let NewSample {
            vehicle_registration_id,
            reading,
        } = self;

        VehicleSample {
            id,
            timestamp: reading.timestamp,
            speed: reading.speed,
            odometer: reading.odometer,
            soc: reading.soc,
            elevation: reading.elevation,
            shift_state: reading.shift_state,
            vehicle_registration_id,
        }
    }
}
