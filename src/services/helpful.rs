use tracing::{debug, info};

use crate::db::models::helpful_vote::HelpfulVoteResult;
use crate::db::store::{HelpfulVoteStore, ReviewStore, StatusFilter};
use crate::error::{require_positive_id, ReviewError, ReviewResult};
use crate::identity::Identity;

/// Marks (or un-marks) a review as helpful for the calling user.
///
/// | wants_helpful | existing row   | effect          |
/// |---------------|----------------|-----------------|
/// | true          | none           | insert `true`   |
/// | true          | `false`        | update to true  |
/// | true          | `true`         | nothing         |
/// | false         | `true`         | delete the row  |
/// | false         | none / `false` | nothing         |
///
/// Only reviews the caller can see (approved, or their own) accept votes;
/// anything else is reported as missing.
///
/// Returns the review's recounted helpful total and the caller's resulting state.
pub async fn set_helpful_vote(
    reviews: &dyn ReviewStore,
    votes: &dyn HelpfulVoteStore,
    review_id: i32,
    identity: &Identity,
    wants_helpful: bool,
) -> ReviewResult<HelpfulVoteResult> {
    let user_id = identity
        .user_id
        .ok_or_else(|| ReviewError::unauthorized("Please login to mark reviews as helpful"))?;
    let review_id = require_positive_id(review_id, "review_id")?;

    let review = reviews
        .fetch_review(review_id)
        .await?
        .filter(|review| StatusFilter::VisibleTo(user_id).admits(review))
        .ok_or_else(|| ReviewError::invalid(format!("review {review_id} does not exist")))?;
    if review.user_id == user_id {
        debug!("User {} is voting on their own review {}", user_id, review_id);
    }

    let existing = votes.fetch_vote(review_id, user_id).await?;
    match (wants_helpful, existing) {
        (true, None) => votes.upsert_vote(review_id, user_id, true).await?,
        (true, Some(vote)) if !vote.is_helpful => votes.upsert_vote(review_id, user_id, true).await?,
        (false, Some(vote)) if vote.is_helpful => votes.delete_vote(vote.id).await?,
        _ => debug!("Helpful vote on review {} by user {} unchanged", review_id, user_id),
    }

    let helpful_count = votes.count_helpful(review_id).await?;
    info!(
        "Review {} helpful={} by user {} (count now {})",
        review_id, wants_helpful, user_id, helpful_count
    );

    Ok(HelpfulVoteResult {
        helpful_count,
        is_helpful: wants_helpful,
    })
}
