//! Mapping of domain errors onto HTTP responses.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use quizdeck_core::error::QuizError;

/// An error returned from a handler.
#[derive(Debug)]
pub struct ApiError(pub QuizError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<QuizError> for ApiError {
    fn from(err: QuizError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(QuizError::Validation(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(QuizError::Validation(format!(
            "Invalid path: {}",
            rejection.body_text()
        )))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            QuizError::Validation(_) => StatusCode::BAD_REQUEST,
            QuizError::NotFound(_) => StatusCode::NOT_FOUND,
            QuizError::Conflict(_) => StatusCode::CONFLICT,
            QuizError::Unauthorized | QuizError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            QuizError::Forbidden(_) => StatusCode::FORBIDDEN,
            QuizError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self.0 {
            QuizError::Storage(e) => {
                tracing::error!("request failed: {e:#}");
                json!({
                    "error": "Internal server error",
                    "message": "An unexpected error occurred",
                })
            }
            QuizError::Unauthorized => json!({ "error": "Authentication required" }),
            QuizError::InvalidCredentials => json!({ "error": "Invalid credentials" }),
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
