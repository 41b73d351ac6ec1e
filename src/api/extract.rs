//! Extractors whose rejections use the `ApiResponse` envelope.
//!
//! Bodies, query strings and path segments that fail to parse become
//! `ReviewError::InvalidArgument` (400) instead of axum's plain-text 400/422.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ReviewError;
use crate::utils::api_response::ApiResponse;

/// `Json<T>` with an envelope rejection
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiResponse<()>))]
pub struct ApiJson<T>(pub T);

/// `Query<T>` with an envelope rejection
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiResponse<()>))]
pub struct ApiQuery<T>(pub T);

/// `Path<T>` with an envelope rejection
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiResponse<()>))]
pub struct ApiPath<T>(pub T);

impl From<JsonRejection> for ApiResponse<()> {
    fn from(rejection: JsonRejection) -> Self {
        ApiResponse::from_review_error(ReviewError::from(rejection))
    }
}

impl From<QueryRejection> for ApiResponse<()> {
    fn from(rejection: QueryRejection) -> Self {
        ApiResponse::from_review_error(ReviewError::from(rejection))
    }
}

impl From<PathRejection> for ApiResponse<()> {
    fn from(rejection: PathRejection) -> Self {
        ApiResponse::from_review_error(ReviewError::from(rejection))
    }
}
