//! API error types with HTTP response mapping.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{DomainError, ValidationError};
use ledger_store::LedgerStoreError;

/// Shown when weight or amount is absent.
pub const MISSING_PARAMS: &str = "缺少必要参数";

/// Shown when a sale exceeds the stock on hand.
pub const INSUFFICIENT_STOCK: &str = "库存不足";

/// Shown when a record id does not exist.
pub const RECORD_NOT_FOUND: &str = "记录不存在";

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Domain logic error.
    Domain(DomainError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Domain(err) => domain_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    match &err {
        DomainError::Validation(validation) => (StatusCode::BAD_REQUEST, validation_message(validation)),
        DomainError::InsufficientStock { .. } => {
            (StatusCode::BAD_REQUEST, INSUFFICIENT_STOCK.to_string())
        }
        DomainError::NotFound(_) => (StatusCode::NOT_FOUND, RECORD_NOT_FOUND.to_string()),
        DomainError::Store(LedgerStoreError::StaleMovement(_)) => {
            (StatusCode::CONFLICT, err.to_string())
        }
        DomainError::Store(_) => {
            tracing::error!(error = %err, "ledger store failure");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

fn validation_message(err: &ValidationError) -> String {
    if err.is_missing() {
        MISSING_PARAMS.to_string()
    } else {
        err.to_string()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Domain(DomainError::Validation(err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
