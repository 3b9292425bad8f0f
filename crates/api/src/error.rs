//! HTTP error mapping.
//!
//! Every failure leaves a handler as `{ "error": <message>, "code": <CODE> }`
//! with a matching status. Internal details are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rigel_core::error::CoreError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Malformed or out-of-range request input.
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

const SANITIZED_MESSAGE: &str = "An internal error occurred";

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Core(CoreError::NotFound { .. }) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Core(CoreError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Core(CoreError::Internal(_)) | AppError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }

    /// Client-facing message.
    fn public_message(&self) -> String {
        match self {
            AppError::Core(CoreError::NotFound { entity, id }) => {
                format!("{entity} with id {id} not found")
            }
            AppError::Core(CoreError::Validation(msg)) | AppError::BadRequest(msg) => msg.clone(),
            AppError::Core(CoreError::Internal(_)) | AppError::InternalError(_) => {
                SANITIZED_MESSAGE.to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorBody {
            error: self.public_message(),
            code,
        };
        (status, Json(body)).into_response()
    }
}
