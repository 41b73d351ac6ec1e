use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::db::models::helpful_vote::HelpfulVote;
use crate::db::models::review::{NewReview, Review, ReviewStatus};
use crate::error::ReviewResult;

/// Which reviews of a school a fetch returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// Approved reviews only
    Approved,
    /// Approved reviews plus every review written by this user
    VisibleTo(i32),
}

impl StatusFilter {
    pub fn for_viewer(user_id: Option<i32>) -> Self {
        user_id.map_or(StatusFilter::Approved, StatusFilter::VisibleTo)
    }

    pub fn admits(&self, review: &Review) -> bool {
        review.status == ReviewStatus::Approved
            || matches!(self, StatusFilter::VisibleTo(user_id) if review.user_id == *user_id)
    }
}

/// Persistence for reviews.
///
/// `fetch_reviews` returns rows newest first (`created_at` desc, then `id` desc).
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn fetch_reviews(&self, school_id: i32, filter: StatusFilter) -> ReviewResult<Vec<Review>>;

    async fn fetch_review(&self, review_id: i32) -> ReviewResult<Option<Review>>;

    async fn insert_review(&self, review: NewReview) -> ReviewResult<i32>;

    /// Returns `false` when no review has this id.
    async fn update_status(&self, review_id: i32, status: ReviewStatus) -> ReviewResult<bool>;

    /// Storage round trip used by readiness checks.
    async fn ping(&self) -> ReviewResult<()>;
}

/// Persistence for helpful votes; implementations keep at most one row per
/// (review, user).
#[async_trait]
pub trait HelpfulVoteStore: Send + Sync {
    async fn fetch_vote(&self, review_id: i32, user_id: i32) -> ReviewResult<Option<HelpfulVote>>;

    /// Inserts the vote, or overwrites `is_helpful` on the existing row.
    async fn upsert_vote(&self, review_id: i32, user_id: i32, is_helpful: bool) -> ReviewResult<()>;

    /// Deleting a row that is already gone is not an error.
    async fn delete_vote(&self, vote_id: i32) -> ReviewResult<()>;

    async fn count_helpful(&self, review_id: i32) -> ReviewResult<i64>;

    /// Helpful counts for several reviews; reviews without votes are absent.
    async fn count_helpful_many(&self, review_ids: &[i32]) -> ReviewResult<HashMap<i32, i64>>;

    /// Which of `review_ids` this user currently marks helpful.
    async fn voted_helpful(&self, review_ids: &[i32], user_id: i32) -> ReviewResult<HashSet<i32>>;
}
