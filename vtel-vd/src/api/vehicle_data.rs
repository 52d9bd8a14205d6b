//! Vehicle data endpoints
//!
//! Routes live under [`API_BASE`]:
//! - `POST /populate`         ingest new source files (201, empty body)
//! - `GET  /`                 paginated samples of one vehicle
//! - `GET  /:id`              one sample by internal id
//! - `GET  /export`           stream a full export of one vehicle
//! - `GET  /vehicle_ids`      every registered vehicle id

use axum::{
    body::Body,
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDateTime;
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tracing::info;
use vtel_common::db::VehicleSample;
use vtel_common::time::parse_timestamp;

use crate::error::{ApiError, ApiResult};
use crate::export::ExportFormat;
use crate::pagination::{PageRequest, DEFAULT_PAGE_LIMIT};
use crate::query::SamplePage;
use crate::store::TimeRange;
use crate::AppState;

/// Base path of the vehicle data API
pub const API_BASE: &str = "/api/v1/vehicle_data";

/// Query parameters for GET /api/v1/vehicle_data/
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub vehicle_id: String,
    #[serde(default, rename = "initial")]
    pub start: Option<String>,
    #[serde(default, rename = "final")]
    pub end: Option<String>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Query parameters for GET /api/v1/vehicle_data/export
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub vehicle_id: String,
    pub export_type: String,
}

/// Parse an optional time bound; blank counts as absent
fn parse_bound(name: &str, raw: Option<&str>) -> ApiResult<Option<NaiveDateTime>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(text) => parse_timestamp(text)
            .map(Some)
            .ok_or_else(|| ApiError::Validation(format!("Invalid '{}' timestamp: {}", name, text))),
    }
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| ApiError::Validation(rejection.body_text()))
}

/// POST /api/v1/vehicle_data/populate
///
/// Ingest every source file whose vehicle id is not yet registered.
pub async fn populate(State(state): State<AppState>) -> ApiResult<StatusCode> {
    let report = state.ingestion.run().await?;
    info!(
        "Populate: {} new vehicles, {} samples",
        report.registered, report.samples
    );
    Ok(StatusCode::CREATED)
}

/// GET /api/v1/vehicle_data/
///
/// Samples of one vehicle in ascending timestamp order, optionally bounded
/// by `initial` and `final` (inclusive).
pub async fn list_vehicle_data(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<SamplePage>> {
    let params = query_params(query)?;

    let page = PageRequest::new(
        params.page.unwrap_or(0),
        params.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
    )?;
    let range = TimeRange::new(
        parse_bound("initial", params.start.as_deref())?,
        parse_bound("final", params.end.as_deref())?,
    );

    let result = state
        .queries
        .list_samples(&params.vehicle_id, &range, page)
        .await?;

    Ok(Json(result))
}

/// GET /api/v1/vehicle_data/:id
pub async fn get_vehicle_data(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<VehicleSample>> {
    let Path(id) = id.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    let sample = state.queries.get_sample(id).await?;
    Ok(Json(sample))
}

/// GET /api/v1/vehicle_data/export
///
/// Writes the export file, then streams it back as an attachment.
pub async fn export_vehicle_data(
    State(state): State<AppState>,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let params = query_params(query)?;
    // Reject unknown formats before touching the store
    let format: ExportFormat = params.export_type.parse()?;

    let exported = state.exports.export(&params.vehicle_id, format).await?;

    let file = tokio::fs::File::open(&exported.path).await?;
    let body = Body::from_stream(ReaderStream::new(file));
    let disposition = format!("attachment; filename=\"{}\"", exported.file_name);

    Ok((
        [
            (header::CONTENT_TYPE, exported.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// GET /api/v1/vehicle_data/vehicle_ids
pub async fn list_vehicle_ids(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    let ids = state.queries.vehicle_ids().await?;
    Ok(Json(ids))
}

/// Build vehicle data routes
///
/// Every route also answers with a trailing slash. Static segments win over
/// `/:id` in the router, so `populate`, `export` and `vehicle_ids` never
/// reach [`get_vehicle_data`].
pub fn vehicle_data_routes() -> Router<AppState> {
    Router::new()
        .route(API_BASE, get(list_vehicle_data))
        .route(&format!("{}/", API_BASE), get(list_vehicle_data))
        .route(&format!("{}/populate", API_BASE), post(populate))
        .route(&format!("{}/populate/", API_BASE), post(populate))
        .route(&format!("{}/export", API_BASE), get(export_vehicle_data))
        .route(&format!("{}/export/", API_BASE), get(export_vehicle_data))
        .route(&format!("{}/vehicle_ids", API_BASE), get(list_vehicle_ids))
        .route(&format!("{}/vehicle_ids/", API_BASE), get(list_vehicle_ids))
        .route(&format!("{}/:id", API_BASE), get(get_vehicle_data))
        .route(&format!("{}/:id/", API_BASE), get(get_vehicle_data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bound_blank_is_absent() {
        assert_eq!(parse_bound("initial", None).unwrap(), None);
        assert_eq!(parse_bound("initial", Some("  ")).unwrap(), None);
    }

    #[test]
    fn test_parse_bound_accepts_iso_text() {
        let bound = parse_bound("final", Some("2023-03-01T12:00:00")).unwrap();
        assert_eq!(
            bound.map(|ts| ts.to_string()),
            Some("2023-03-01 12:00:00".to_string())
        );
    }

    #[test]
    fn test_parse_bound_rejects_garbage() {
        let err = parse_bound("initial", Some("yesterday")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg.contains("initial")));
    }
}
