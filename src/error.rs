use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use thiserror::Error;

/// Result type for review operations
pub type ReviewResult<T> = Result<T, ReviewError>;

/// Errors surfaced by the review services.
///
/// Callers only need to tell the three kinds apart; message text is for logs.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ReviewError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ReviewError::InvalidArgument(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ReviewError::Unauthorized(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ReviewError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ReviewError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ReviewError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ReviewError {
    fn from(e: sqlx::Error) -> Self {
        ReviewError::Storage(e.to_string())
    }
}

impl From<JsonRejection> for ReviewError {
    fn from(rejection: JsonRejection) -> Self {
        ReviewError::InvalidArgument(rejection.body_text())
    }
}

impl From<QueryRejection> for ReviewError {
    fn from(rejection: QueryRejection) -> Self {
        ReviewError::InvalidArgument(rejection.body_text())
    }
}

impl From<PathRejection> for ReviewError {
    fn from(rejection: PathRejection) -> Self {
        ReviewError::InvalidArgument(rejection.body_text())
    }
}

/// Rejects ids that cannot name a stored row.
pub fn require_positive_id(id: i32, field: &str) -> ReviewResult<i32> {
    if id > 0 {
        Ok(id)
    } else {
        Err(ReviewError::invalid(format!("{field} must be a positive integer")))
    }
}
