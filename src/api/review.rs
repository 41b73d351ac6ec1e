use axum::{
    extract::{Extension, State},
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, OpenApi};

use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::SecurityAddon;
use crate::app_state::AppState;
use crate::db::models::helpful_vote::{HelpfulAction, HelpfulVoteRequest, HelpfulVoteResult};
use crate::db::models::rating::{
    CategoryAverage, CategoryScore, KeywordCount, KeywordFrequency, RatingBreakdown, RatingSummary,
};
use crate::db::models::review::{
    CategoryRatings, ListedReview, ListingParams, ModerationAction, ModerationRequest,
    RatingCategory, Review, ReviewForm, ReviewPage, ReviewSort, ReviewStatus,
};
use crate::identity::Identity;
use crate::services::{helpful, listing, moderation, rating};
use crate::utils::api_response::ApiResponse;

pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/schools/{school_id}/rating-breakdown", get(get_rating_breakdown))
        .route(
            "/schools/{school_id}/reviews",
            get(list_reviews).post(submit_review),
        )
        .route("/schools/{school_id}/review-keywords", get(get_review_keywords))
        .route("/reviews/{review_id}/helpful", post(set_helpful_vote))
        .route("/reviews/{review_id}/status", patch(moderate_review))
}

/// Query string of the keyword endpoint
#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct KeywordParams {
    /// Keep only the N most frequent keywords
    pub top: Option<usize>,
}

/// Rating summary for a school
#[utoipa::path(
    get,
    path = "/schools/{school_id}/rating-breakdown",
    tag = "Reviews",
    params(
        ("school_id" = i32, Path, description = "ID of the school"),
    ),
    responses(
        (status = 200, description = "Rating breakdown computed", body = RatingSummary),
        (status = 400, description = "Invalid school ID"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn get_rating_breakdown(
    State(state): State<AppState>,
    ApiPath(school_id): ApiPath<i32>,
) -> Result<ApiResponse<RatingSummary>, ApiResponse<()>> {
    let summary = rating::compute_rating_summary(state.reviews.as_ref(), school_id).await?;
    Ok(ApiResponse::ok("Rating breakdown retrieved successfully", summary))
}

/// Page of reviews for a school
#[utoipa::path(
    get,
    path = "/schools/{school_id}/reviews",
    tag = "Reviews",
    params(
        ("school_id" = i32, Path, description = "ID of the school"),
        ListingParams
    ),
    responses(
        (status = 200, description = "Reviews retrieved successfully", body = ReviewPage),
        (status = 400, description = "Invalid paging parameters"),
        (status = 500, description = "Internal Server Error")
    ),
    security(
        (),
        ("bearerAuth" = [])
    )
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(school_id): ApiPath<i32>,
    ApiQuery(params): ApiQuery<ListingParams>,
) -> Result<ApiResponse<ReviewPage>, ApiResponse<()>> {
    let query = params.validate(
        school_id,
        state.config.default_page_size,
        state.config.max_page_size,
    )?;
    let page = listing::compute_review_listing(
        state.reviews.as_ref(),
        state.votes.as_ref(),
        &query,
        &identity,
    )
    .await?;
    Ok(ApiResponse::ok("Reviews retrieved successfully", page))
}

/// Keywords mentioned in a school's approved reviews
#[utoipa::path(
    get,
    path = "/schools/{school_id}/review-keywords",
    tag = "Reviews",
    params(
        ("school_id" = i32, Path, description = "ID of the school"),
        KeywordParams
    ),
    responses(
        (status = 200, description = "Keyword frequencies computed", body = KeywordFrequency),
        (status = 400, description = "Invalid school ID"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn get_review_keywords(
    State(state): State<AppState>,
    ApiPath(school_id): ApiPath<i32>,
    ApiQuery(params): ApiQuery<KeywordParams>,
) -> Result<ApiResponse<KeywordFrequency>, ApiResponse<()>> {
    let mut frequencies = rating::extract_keyword_frequencies(
        state.reviews.as_ref(),
        school_id,
        &state.config.review_keywords,
    )
    .await?;
    if let Some(top) = params.top {
        frequencies.truncate(top);
    }
    Ok(ApiResponse::ok("Review keywords retrieved successfully", frequencies))
}

/// Submit a review; it stays hidden from others until approved
#[utoipa::path(
    post,
    path = "/schools/{school_id}/reviews",
    tag = "Reviews",
    params(
        ("school_id" = i32, Path, description = "ID of the school being reviewed"),
    ),
    request_body = ReviewForm,
    responses(
        (status = 201, description = "Review submitted for moderation", body = i32),
        (status = 400, description = "Invalid ratings or photos"),
        (status = 401, description = "Login required"),
        (status = 500, description = "Internal Server Error")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn submit_review(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(school_id): ApiPath<i32>,
    form: Result<ApiJson<ReviewForm>, ApiResponse<()>>,
) -> Result<ApiResponse<i32>, ApiResponse<()>> {
    // Login is checked before the body so anonymous callers always get 401
    identity.require_user()?;
    let ApiJson(form) = form?;
    let id = moderation::submit_review(state.reviews.as_ref(), school_id, &identity, form).await?;
    Ok(ApiResponse::created(
        "Review submitted successfully! It will be reviewed by admin before publishing.",
        id,
    ))
}

/// Mark or un-mark a review as helpful
#[utoipa::path(
    post,
    path = "/reviews/{review_id}/helpful",
    tag = "Reviews",
    params(
        ("review_id" = i32, Path, description = "ID of the review"),
    ),
    request_body = HelpfulVoteRequest,
    responses(
        (status = 200, description = "Vote recorded", body = HelpfulVoteResult),
        (status = 400, description = "Invalid review ID or unknown action"),
        (status = 401, description = "Login required"),
        (status = 500, description = "Internal Server Error")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn set_helpful_vote(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(review_id): ApiPath<i32>,
    payload: Result<ApiJson<HelpfulVoteRequest>, ApiResponse<()>>,
) -> Result<ApiResponse<HelpfulVoteResult>, ApiResponse<()>> {
    identity.require_user()?;
    let ApiJson(payload) = payload?;
    let result = helpful::set_helpful_vote(
        state.reviews.as_ref(),
        state.votes.as_ref(),
        review_id,
        &identity,
        payload.action.wants_helpful(),
    )
    .await?;
    Ok(ApiResponse::ok("Helpful vote updated", result))
}

/// Approve or reject a review (admin only)
#[utoipa::path(
    patch,
    path = "/reviews/{review_id}/status",
    tag = "Reviews",
    params(
        ("review_id" = i32, Path, description = "ID of the review"),
    ),
    request_body = ModerationRequest,
    responses(
        (status = 200, description = "Review status changed", body = ReviewStatus),
        (status = 400, description = "Unknown review or transition not allowed"),
        (status = 401, description = "Admin login required"),
        (status = 500, description = "Internal Server Error")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn moderate_review(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(review_id): ApiPath<i32>,
    payload: Result<ApiJson<ModerationRequest>, ApiResponse<()>>,
) -> Result<ApiResponse<ReviewStatus>, ApiResponse<()>> {
    identity.require_user()?;
    let ApiJson(payload) = payload?;
    let status =
        moderation::moderate_review(state.reviews.as_ref(), review_id, &identity, payload.action)
            .await?;
    Ok(ApiResponse::ok("Review status updated", status))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        get_rating_breakdown,
        list_reviews,
        get_review_keywords,
        submit_review,
        set_helpful_vote,
        moderate_review
    ),
    components(
        schemas(
            Review, ReviewStatus, CategoryRatings, RatingCategory, ReviewForm, ReviewSort,
            ListedReview, ReviewPage, ModerationAction, ModerationRequest,
            HelpfulAction, HelpfulVoteRequest, HelpfulVoteResult,
            CategoryAverage, RatingBreakdown, CategoryScore, RatingSummary,
            KeywordCount, KeywordFrequency
        )
    ),
    tags(
        (name = "Reviews", description = "School review aggregation and helpful votes")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ReviewDoc;
