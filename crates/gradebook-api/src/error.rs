//! API error handling
//!
//! Author: hephaex@gmail.com

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gradebook_core::GradebookError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Machine-readable error code
    #[schema(example = "BAD_REQUEST")]
    pub code: String,
    /// Human-readable message
    #[schema(example = "Invalid input")]
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn invalid_credentials() -> Self {
        Self::new("INVALID_CREDENTIALS", "Invalid credentials")
    }

    pub fn forbidden() -> Self {
        Self::new("FORBIDDEN", "Access denied")
    }

    pub fn internal_error() -> Self {
        Self::new("INTERNAL_ERROR", "Internal server error")
    }
}

/// Application error type
///
/// Internal and database details are logged, never returned to the client.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    InvalidScore(String),
    InvalidCredentials,
    Internal(String),
    Database(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::bad_request(msg)),
            AppError::InvalidScore(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("INVALID_SCORE", msg))
            }
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, ApiError::invalid_credentials())
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, ApiError::internal_error())
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("DATABASE_ERROR", "Database operation failed"),
                )
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<GradebookError> for AppError {
    fn from(err: GradebookError) -> Self {
        match err {
            GradebookError::ValidationError(msg) => AppError::BadRequest(msg),
            GradebookError::InvalidScore(_) => {
                AppError::InvalidScore("Score must be between 0 and 100".to_string())
            }
            GradebookError::DuplicateEmail(_) => {
                AppError::BadRequest("Email already registered".to_string())
            }
            GradebookError::DatabaseError(msg) => AppError::Database(msg),
            GradebookError::Other(err) => AppError::Internal(err.to_string()),
        }
    }
}

/// JSON body extractor whose rejection is a 400 [`ApiError`]
///
/// Malformed or mistyped bodies get the same error shape as every other
/// failure instead of axum's plain-text rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(reason = %rejection.body_text(), "Rejected request body");
                Err(AppError::BadRequest("Invalid input".to_string()))
            }
        }
    }
}
