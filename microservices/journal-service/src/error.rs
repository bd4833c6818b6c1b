//! Error types for the Journal Service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use waymark_core::WaymarkError;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Journal Service error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Store(#[from] waymark_fstore::StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<WaymarkError> for Error {
    fn from(err: WaymarkError) -> Self {
        match err {
            WaymarkError::Validation(msg) => Error::InvalidRequest(msg),
            WaymarkError::NotFound(msg) => Error::NotFound(msg),
            other => Error::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::InvalidRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Error::Store(_) | Error::Internal(_) => {
                tracing::error!("Internal error: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}
