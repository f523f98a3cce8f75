//! CRUD handlers for the cohorts collection. Each handler makes exactly one
//! store call and maps the failure to its operation's error class.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;
use crate::store::Document;

/// GET /api/cohorts - list all cohorts
pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let cohorts = state
        .store
        .cohorts()
        .find_all()
        .await
        .map_err(ApiError::lookup)?;

    Ok(Json(Value::Array(
        cohorts.into_iter().map(Document::into_value).collect(),
    )))
}

/// GET /api/cohorts/:cohortId - fetch one cohort; null when the id resolves
/// to nothing
pub async fn get(
    State(state): State<AppState>,
    Path(cohort_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let cohort = state
        .store
        .cohorts()
        .find_by_id(&cohort_id)
        .await
        .map_err(ApiError::lookup)?;

    Ok(Json(cohort.map(Document::into_value).unwrap_or(Value::Null)))
}

/// POST /api/cohorts - create a cohort from the request body
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let cohort = state
        .store
        .cohorts()
        .create(body)
        .await
        .map_err(ApiError::create)?;

    Ok((StatusCode::CREATED, Json(cohort.into_value())))
}

/// PATCH /api/cohorts/:cohortId - partial update, re-validated by the store
pub async fn update(
    State(state): State<AppState>,
    Path(cohort_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let cohort = state
        .store
        .cohorts()
        .find_and_update_by_id(&cohort_id, body)
        .await
        .map_err(ApiError::client_data)?;

    Ok(Json(cohort.map(Document::into_value).unwrap_or(Value::Null)))
}

/// DELETE /api/cohorts/:cohortId - delete and respond with null
pub async fn delete(
    State(state): State<AppState>,
    Path(cohort_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .store
        .cohorts()
        .find_and_delete_by_id(&cohort_id)
        .await
        .map_err(ApiError::client_data)?;

    Ok(Json(Value::Null))
}
