//! API error taxonomy. Every failure path answers with a JSON body of the
//! form `{"error": "..."}` so clients can surface the message directly.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing required fields: {}", .fields.join(", "))]
    Validation { fields: Vec<String> },
    #[error("Record not found")]
    NotFound,
    #[error("Invalid username or password")]
    BadCredentials,
    #[error("Missing authorization token")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadCredentials => StatusCode::UNAUTHORIZED,
            ApiError::MissingToken => StatusCode::UNAUTHORIZED,
            ApiError::InvalidToken => StatusCode::FORBIDDEN,
            ApiError::Internal(err) => {
                error!("Internal error serving request: {:#}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let message = match &self {
            // Don't leak internals to the client.
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
