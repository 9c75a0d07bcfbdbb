//! HTTP error responses

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use data_service::ServiceError;
use std::error::Error as _;
use thiserror::Error;
use tracing::{debug, error};

/// Message returned for request bodies or parameters that do not decode
pub const INVALID_REQUEST_MESSAGE: &str = "Invalid request data. Please check your input.";

/// Message returned when a record does not exist
pub const NOT_FOUND_MESSAGE: &str = "Data not found.";

/// Errors a handler can answer with
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{}", INVALID_REQUEST_MESSAGE)]
    InvalidRequest,

    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest | ApiError::Service(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

/// Render `{"error": "<message>"}`
pub fn error_body(message: &str) -> String {
    format!(
        "{{\"error\": {}}}",
        serde_json::Value::String(message.to_string())
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Service(ServiceError::Storage { source, .. }) => {
                error!(error = %self, cause = %source, "Storage failure");
            }
            ApiError::Service(err) => {
                debug!(error = %err, cause = ?err.source().map(|s| s.to_string()), "Request rejected");
            }
            _ => {}
        }

        (
            self.status(),
            [(header::CONTENT_TYPE, "application/json")],
            error_body(&self.to_string()),
        )
            .into_response()
    }
}
