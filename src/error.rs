// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::store::StoreError;

/// Handler-boundary error. Every store failure is converted into one of
/// these three classes; the class is decided by the operation, not by the
/// error kind, and the status mapping is a compatibility contract:
/// read failures are 404, create failures are 500, update/delete failures
/// are 400 with a fixed message.
#[derive(Debug)]
pub enum ApiError {
    // 404 Not Found - list/get paths, dominated by unresolvable ids
    Lookup(String),

    // 500 Internal Server Error - create rejected by the store schema
    Create(String),

    // 400 Bad Request - update/delete with the fixed generic message
    ClientData,
}

impl ApiError {
    /// Wrap a store failure on a read path.
    pub fn lookup(err: StoreError) -> Self {
        ApiError::Lookup(err.to_string())
    }

    /// Wrap a store failure on a create path.
    pub fn create(err: StoreError) -> Self {
        ApiError::Create(err.to_string())
    }

    /// Wrap a store failure on an update/delete path. The detail is logged
    /// but the client always sees the same message.
    pub fn client_data(err: StoreError) -> Self {
        tracing::debug!("update/delete rejected: {}", err);
        ApiError::ClientData
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Lookup(_) => StatusCode::NOT_FOUND,
            ApiError::Create(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ClientData => StatusCode::BAD_REQUEST,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Lookup(msg) | ApiError::Create(msg) => msg,
            ApiError::ClientData => "Invalid data sent! ",
        }
    }

    /// The failure envelope used by every error branch.
    pub fn to_json(&self) -> Value {
        json!({
            "status": "fail",
            "message": self.message(),
        })
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_is_fixed() {
        assert_eq!(
            ApiError::Lookup("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Create("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::ClientData.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn client_data_message_is_literal() {
        assert_eq!(ApiError::ClientData.message(), "Invalid data sent! ");
    }

    #[test]
    fn envelope_shape() {
        let body = ApiError::Lookup("malformed document id \"abc\"".into()).to_json();
        assert_eq!(body["status"], "fail");
        assert_eq!(body["message"], "malformed document id \"abc\"");
    }
}
