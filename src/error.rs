//! Domain error types shared by the storage, analysis and gateway services.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::fmt;

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// File metadata exists but its bytes are gone from disk
    #[error("File {0} is missing from disk")]
    NotFoundOnDisk(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Request body exceeds the configured limit
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Sibling service unreachable, timed out or answered non-2xx
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Analysis ran and a failed report was persisted
    #[error("Analysis failed: {reason}")]
    AnalysisFailed { report_id: String, reason: String },

    /// Disk storage operation failed
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    /// Stable machine-readable code used in error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) | AppError::Storage(_) => "INTERNAL_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::NotFoundOnDisk(_) => "FILE_MISSING_ON_DISK",
            AppError::InvalidInput(_) => "VALIDATION_ERROR",
            AppError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            AppError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            AppError::AnalysisFailed { .. } => "ANALYSIS_FAILED",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_)
            | AppError::Storage(_)
            | AppError::NotFoundOnDisk(_)
            | AppError::AnalysisFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (response_message, details) = match self {
            AppError::Database(err_str) => {
                tracing::error!("Database error: {}", err_str);
                ("An internal database error occurred".to_string(), None)
            }
            AppError::Storage(err_str) => {
                tracing::error!("Storage error: {}", err_str);
                ("An internal storage error occurred".to_string(), None)
            }
            AppError::ServiceUnavailable(reason) => (
                "A required service is unavailable".to_string(),
                Some(reason.clone()),
            ),
            AppError::AnalysisFailed { report_id, .. } => {
                (self.to_string(), Some(report_id.clone()))
            }
            _ => (self.to_string(), None),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.code().to_string(),
            message: response_message,
            details,
        })
    }
}

/// Error response body matching OpenAPI schema.
#[derive(Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

// Conversion implementations for common error types

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::ServiceUnavailable(format!("request timed out: {}", err))
        } else {
            AppError::ServiceUnavailable(err.to_string())
        }
    }
}
