//! Data Routes

use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use storage::Data;
use tracing::debug;

use crate::{ApiError, AppState};

/// Query parameters for the list endpoint
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// 1-based page; anything below 1 returns every record
    #[serde(default)]
    pub page: i64,
    /// Page size, defaults to the configured value
    pub rows_per_page: Option<u32>,
}

fn decode(body: &[u8]) -> Result<Data, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        debug!("Rejected request body: {}", e);
        ApiError::InvalidRequest
    })
}

fn record<T>(op: &'static str, result: Result<T, ApiError>) -> Result<T, ApiError> {
    let outcome = match &result {
        Ok(_) => "ok",
        Err(ApiError::InvalidRequest) => "bad_request",
        Err(ApiError::NotFound) => "not_found",
        Err(ApiError::Service(_)) => "service_error",
    };
    metrics::counter!("data_api_requests_total", "op" => op, "outcome" => outcome).increment(1);
    result
}

/// Create a record
pub async fn create(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Data>), ApiError> {
    record("create", create_data(&state, &body).await)
}

async fn create_data(state: &AppState, body: &[u8]) -> Result<(StatusCode, Json<Data>), ApiError> {
    let mut data = decode(body)?;
    state.service.create(&mut data).await?;
    Ok((StatusCode::CREATED, Json(data)))
}

/// Get one record by id
pub async fn get_one(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Data>, ApiError> {
    record("read_one", read_data(&state, id).await)
}

async fn read_data(
    state: &AppState,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Data>, ApiError> {
    let Path(id) = id.map_err(|_| ApiError::InvalidRequest)?;
    state
        .service
        .read_one(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// List records, paged
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Data>>, ApiError> {
    record("read_many", list_data(&state, query).await)
}

async fn list_data(
    state: &AppState,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Data>>, ApiError> {
    let Query(query) = query.map_err(|_| ApiError::InvalidRequest)?;
    let rows_per_page = state.pagination.rows_per_page(query.rows_per_page)?;
    let data = state.service.read_many(query.page, rows_per_page).await?;
    Ok(Json(data))
}

/// Replace a record; the path id wins over any id in the body
pub async fn update(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> Result<Json<Data>, ApiError> {
    record("update", update_data(&state, id, &body).await)
}

async fn update_data(
    state: &AppState,
    id: Result<Path<i64>, PathRejection>,
    body: &[u8],
) -> Result<Json<Data>, ApiError> {
    let Path(id) = id.map_err(|_| ApiError::InvalidRequest)?;
    let mut data = decode(body)?;
    data.id = id;
    match state.service.update(&data).await? {
        0 => Err(ApiError::NotFound),
        _ => Ok(Json(data)),
    }
}

/// Delete a record
pub async fn delete(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    record("delete", delete_data(&state, id).await)
}

async fn delete_data(
    state: &AppState,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id.map_err(|_| ApiError::InvalidRequest)?;
    let data = Data {
        id,
        ..Default::default()
    };
    match state.service.delete(&data).await? {
        0 => Err(ApiError::NotFound),
        _ => Ok(StatusCode::NO_CONTENT),
    }
}
