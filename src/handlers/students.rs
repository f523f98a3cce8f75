//! CRUD handlers for the students collection, plus the students-by-cohort
//! relationship lookup.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;
use crate::store::Document;

/// GET /api/students - list all students
pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let students = state
        .store
        .students()
        .find_all()
        .await
        .map_err(ApiError::lookup)?;

    Ok(Json(Value::Array(
        students.into_iter().map(Document::into_value).collect(),
    )))
}

/// GET /api/students/:studentId - fetch one student; null when the id
/// resolves to nothing
pub async fn get(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let student = state
        .store
        .students()
        .find_by_id(&student_id)
        .await
        .map_err(ApiError::lookup)?;

    Ok(Json(student.map(Document::into_value).unwrap_or(Value::Null)))
}

/// POST /api/students - create a student from the request body
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let student = state
        .store
        .students()
        .create(body)
        .await
        .map_err(ApiError::create)?;

    Ok((StatusCode::CREATED, Json(student.into_value())))
}

/// PATCH /api/students/:studentId - partial update, re-validated by the store
pub async fn update(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let student = state
        .store
        .students()
        .find_and_update_by_id(&student_id, body)
        .await
        .map_err(ApiError::client_data)?;

    Ok(Json(student.map(Document::into_value).unwrap_or(Value::Null)))
}

/// DELETE /api/students/:studentId - delete and respond with null
pub async fn delete(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .store
        .students()
        .find_and_delete_by_id(&student_id)
        .await
        .map_err(ApiError::client_data)?;

    Ok(Json(Value::Null))
}

/// GET /api/students/cohort/:cohortId - students in a cohort, with the
/// cohort reference expanded into the full record
pub async fn list_by_cohort(
    State(state): State<AppState>,
    Path(cohort_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let students = state
        .store
        .students_in_cohort(&cohort_id)
        .await
        .map_err(ApiError::lookup)?;

    Ok(Json(Value::Array(students)))
}
