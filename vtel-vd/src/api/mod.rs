//! HTTP API handlers for vtel-vd

pub mod health;
pub mod vehicle_data;

pub use health::health_routes;
pub use vehicle_data::{vehicle_data_routes, API_BASE};
