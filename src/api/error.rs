use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::likeday::LikeDayError;

/// API error types returned from handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Price source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// Error response that gets serialized to JSON
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::SourceUnavailable(_) => StatusCode::BAD_GATEWAY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::ValidationError(_) => "ValidationError",
            ApiError::SourceUnavailable(_) => "SourceUnavailable",
            ApiError::InternalError(_) => "InternalServerError",
        }
    }

    /// Map a pipeline failure. Core validation errors ride inside the anyhow
    /// chain and map to 400; anything else is an upstream source failure.
    pub fn from_pipeline(error: anyhow::Error) -> Self {
        match error.downcast_ref::<LikeDayError>() {
            Some(e) => ApiError::ValidationError(e.to_string()),
            None => ApiError::SourceUnavailable(format!("{error:#}")),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_type = self.error_type();

        let message = match &self {
            ApiError::InternalError(_) => {
                tracing::error!(error = %self, "API error occurred");
                "An internal error occurred".to_string()
            }
            ApiError::SourceUnavailable(_) => {
                tracing::warn!(error = %self, "price source failure");
                "Price source temporarily unavailable".to_string()
            }
            _ => {
                tracing::debug!(error = %self, "Client error");
                self.to_string()
            }
        };

        let error_response = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<LikeDayError> for ApiError {
    fn from(error: LikeDayError) -> Self {
        ApiError::ValidationError(error.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors.to_string())
    }
}
