use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use health_watch_domain::errors::{EngineError, ServiceError};

use crate::entities::common::ErrorResponse;

/// Errors returned by the HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Malformed query parameter or body field
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(msg.clone())),
            ApiError::Service(err) => match err {
                ServiceError::Engine(EngineError::Validation(msg)) => {
                    (StatusCode::BAD_REQUEST, ErrorResponse::new("validation_error", msg.clone()))
                }
                ServiceError::Engine(EngineError::IncompleteInput(msg)) => {
                    (StatusCode::BAD_REQUEST, ErrorResponse::new("incomplete_input", msg.clone()))
                }
                ServiceError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::new("not_found", msg.clone())),
                ServiceError::InsufficientData(msg) => {
                    (StatusCode::NOT_FOUND, ErrorResponse::new("insufficient_data", msg.clone()))
                }
                ServiceError::Forbidden(msg) => (StatusCode::FORBIDDEN, ErrorResponse::new("forbidden", msg.clone())),
                ServiceError::InvalidState(msg) => {
                    (StatusCode::CONFLICT, ErrorResponse::new("invalid_state", msg.clone()))
                }
                ServiceError::Repository(msg) => {
                    error!("Repository failure: {}", msg);
                    (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::internal_error())
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.parts();
        (status, Json(body)).into_response()
    }
}
