//! Standardized error responses for the API.
//!
//! Every error leaves the server as a JSON envelope with a stable error
//! code, so clients can branch on `errorDetails.errorCode` without parsing
//! messages.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use timeline_core::CoreError;

use crate::error::ServerError;

/// API error type for standard error responses
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),
    /// Missing or unusable identity (401)
    Unauthorized(String),
    /// Wrapped server error
    ServerError(ServerError),
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

impl From<ServerError> for ApiError {
    fn from(err: ServerError) -> Self {
        ApiError::ServerError(err)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::ServerError(err.into())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::ServerError(err) => write!(f, "{}", err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_code, message) = match &self {
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "ERR_BAD_REQUEST", msg.clone())
            }
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "ERR_UNAUTHORIZED", msg.clone())
            }
            ApiError::ServerError(err) => (status_for(err), code_for(err), err.to_string()),
        };

        let body = Json(json!({
            "error": message,
            "errorDetails": {
                "errorCode": error_code,
                "errorMessage": message,
            }
        }));

        (status, body).into_response()
    }
}

fn status_for(err: &ServerError) -> StatusCode {
    match err {
        ServerError::NotFound(_) => StatusCode::NOT_FOUND,
        ServerError::ValidationError(_) => StatusCode::BAD_REQUEST,
        ServerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        ServerError::Forbidden(_) => StatusCode::FORBIDDEN,
        ServerError::Conflict(_) => StatusCode::CONFLICT,
        ServerError::StateStoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ServerError::BlobStoreError(_) => StatusCode::BAD_GATEWAY,
        ServerError::ConfigError(_) | ServerError::InternalError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn code_for(err: &ServerError) -> &'static str {
    match err {
        ServerError::NotFound(_) => "ERR_NOT_FOUND",
        ServerError::ValidationError(_) => "ERR_VALIDATION",
        ServerError::Unauthorized(_) => "ERR_UNAUTHORIZED",
        ServerError::Forbidden(_) => "ERR_FORBIDDEN",
        ServerError::Conflict(_) => "ERR_CONFLICT",
        ServerError::StateStoreError(_) => "ERR_STATE_STORE",
        ServerError::BlobStoreError(_) => "ERR_BLOB_STORE",
        ServerError::ConfigError(_) => "ERR_CONFIG",
        ServerError::InternalError(_) => "ERR_INTERNAL",
    }
}
