use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::error::ReviewError;

/// JSON envelope shared by every review endpoint.
///
/// Failures carry `errors: { kind, message }` where `kind` is one of
/// `invalid_argument`, `unauthorized` or `storage`.
#[derive(Serialize, Deserialize, Debug)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub status_code: u16,
    pub message: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<serde_json::Value>,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response
    pub fn success(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        ApiResponse {
            success: true,
            status_code: status.as_u16(),
            message: message.into(),
            timestamp: Utc::now().to_rfc3339(),
            data: Some(data),
            errors: None,
        }
    }

    /// `200 OK`
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::success(StatusCode::OK, message, data)
    }

    /// `201 Created`, data is the new row's id
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::success(StatusCode::CREATED, message, data)
    }

    /// Create an error response
    pub fn error(
        status: StatusCode,
        message: impl Into<String>,
        errors: Option<serde_json::Value>,
    ) -> Self {
        ApiResponse {
            success: false,
            status_code: status.as_u16(),
            message: message.into(),
            timestamp: Utc::now().to_rfc3339(),
            data: None,
            errors,
        }
    }
}

impl ApiResponse<()> {
    /// ✅ Maps a review failure onto the envelope.
    ///
    /// Storage details are logged here and never sent to the client.
    pub fn from_review_error(e: ReviewError) -> Self {
        let (kind, message, detail) = match &e {
            ReviewError::InvalidArgument(m) => ("invalid_argument", "Invalid request", m.clone()),
            ReviewError::Unauthorized(m) => ("unauthorized", "Unauthorized", m.clone()),
            ReviewError::Storage(m) => {
                error!("Review storage failure: {}", m);
                ("storage", "Internal Server Error", "review storage unavailable".to_string())
            }
        };
        Self::error(
            e.status_code(),
            message,
            Some(json!({ "kind": kind, "message": detail })),
        )
    }
}

impl From<ReviewError> for ApiResponse<()> {
    fn from(e: ReviewError) -> Self {
        ApiResponse::from_review_error(e)
    }
}
