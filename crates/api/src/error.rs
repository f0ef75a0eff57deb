//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::OrderError;
use lifecycle::EngineError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Lifecycle engine error.
    Engine(EngineError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Engine(err) => engine_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn engine_error_to_response(err: EngineError) -> (StatusCode, String) {
    match &err {
        EngineError::InvalidTransition { .. }
        | EngineError::NotAssignable { .. }
        | EngineError::Closed { .. }
        | EngineError::Conflict { .. } => (StatusCode::CONFLICT, err.to_string()),
        EngineError::Unauthorized(_) => (StatusCode::FORBIDDEN, err.to_string()),
        EngineError::PaymentNotCleared(_) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
        EngineError::NotFound(_) | EngineError::StaffNotFound(_) => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        EngineError::Order(order_err) => match order_err {
            OrderError::EmptyOrder
            | OrderError::InvalidQuantity { .. }
            | OrderError::InvalidPrice { .. }
            | OrderError::AmountOverflow
            | OrderError::EmptyProofReference
            | OrderError::UnknownStatus { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        },
        EngineError::Store(_) => {
            tracing::error!(error = %err, "store error");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError::Engine(err)
    }
}
