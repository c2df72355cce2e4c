use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::decoding::DecodeError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Decoding error: {0}")]
    Decoding(#[from] DecodeError),

    #[error("Malformed upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Status and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Decoding(DecodeError::UnsupportedFormat { .. }) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_FORMAT")
            }
            AppError::Decoding(DecodeError::Io(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "DECODING_IO_ERROR")
            }
            AppError::Decoding(_) => (StatusCode::UNPROCESSABLE_ENTITY, "DECODING_ERROR"),
            AppError::Multipart(_) => (StatusCode::BAD_REQUEST, "MALFORMED_UPLOAD"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
            AppError::Decoding(DecodeError::Io(e)) => {
                tracing::error!("Decoding IO error: {e}");
                "The document could not be read".to_string()
            }
            AppError::Decoding(e) => e.to_string(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Multipart(e) => e.body_text(),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
