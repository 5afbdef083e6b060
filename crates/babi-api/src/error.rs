//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use babi_models::RequestError;
use babi_providers::ProviderError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Public message for failures no handler classified.
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(String),

    #[error("Rate limited")]
    RateLimited,

    /// The message is the caller-facing one; details are logged where raised.
    #[error("{0}")]
    Internal(String),

    #[error("Dependency error: {0}")]
    Dependency(#[from] ProviderError),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) | ApiError::Dependency(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the response body.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Dependency(_) => UNEXPECTED_ERROR.to_string(),
            ApiError::RateLimited => "Rate limit exceeded. Please try again later.".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<RequestError> for ApiError {
    fn from(e: RequestError) -> Self {
        if e.is_authorization() {
            ApiError::Forbidden(e.to_string())
        } else {
            ApiError::Validation(e.to_string())
        }
    }
}

/// Error body: always a single `error` string.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if let ApiError::Dependency(e) = &self {
            error!(error = %e, "Unhandled dependency failure");
        }

        let body = ErrorResponse {
            error: self.public_message(),
        };

        (status, Json(body)).into_response()
    }
}
