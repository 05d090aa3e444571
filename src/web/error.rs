//! Web error types for the relay server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::client::error::ClientError;

/// Error type for relay API operations.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// Bad request with validation error.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The upstream API call failed.
    #[error("Upstream error: {0}")]
    Upstream(#[from] ClientError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body, matching the `{ "error": ... }` shape the original
/// API routes return.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            WebError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            WebError::Upstream(e) => {
                tracing::error!("Upstream API error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error processing request".to_string(),
                )
            }
            WebError::Internal(msg) => {
                tracing::error!("Internal server error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
