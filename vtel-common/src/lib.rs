//! # VTEL Common Library
//!
//! Shared code for the vehicle telemetry services including:
//! - Database pool initialisation, schema and models
//! - Error taxonomy
//! - Bootstrap configuration loading
//! - Timestamp parsing and rendering

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
