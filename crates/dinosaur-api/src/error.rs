//! # API Errors
//!
//! Every failure a handler can hit, with its HTTP status mapping.

use crate::codec::DecodeError;
use crate::message::ApiResponse;
use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dinosaur_domain::DinosaurId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for handler operations
pub type ApiResult<T> = Result<T, ApiError>;

/// API errors
#[derive(Debug, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Malformed or missing client input
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// No dinosaur with this id
    #[error("dinosaur {0} not found")]
    NotFound(DinosaurId),

    /// Request body exceeded the configured limit
    #[error("request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    /// Request body stream failed before it was fully read
    #[error("failed to read request body: {0}")]
    UnreadableBody(String),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Any failure below the persistence port
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Response could not be serialized
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Decode(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UnreadableBody(_) => StatusCode::BAD_REQUEST,
            ApiError::StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show a client. Server-side causes stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::UnreadableBody(_) => "unreadable body".to_string(),
            ApiError::StorageUnavailable(_) => "storage unavailable".to_string(),
            ApiError::Encode(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }

    /// Convert into the response sent to the client
    pub fn into_api_response(self) -> ApiResponse {
        let status = self.status_code();

        // Not found carries no body
        if let ApiError::NotFound(_) = self {
            return ApiResponse::empty(status);
        }

        let body = ErrorResponse {
            error: self.public_message(),
        };
        match serde_json::to_vec(&body) {
            Ok(bytes) => ApiResponse::json(status, Bytes::from(bytes)),
            Err(_) => ApiResponse::empty(status),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.into_api_response().into_response()
    }
}
