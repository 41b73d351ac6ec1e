use tracing::{info, warn};

use crate::db::models::review::{ModerationAction, ReviewForm, ReviewStatus};
use crate::db::store::ReviewStore;
use crate::error::{require_positive_id, ReviewError, ReviewResult};
use crate::identity::Identity;

/// Stores a new review in `Pending` state and returns its id.
pub async fn submit_review(
    store: &dyn ReviewStore,
    school_id: i32,
    identity: &Identity,
    form: ReviewForm,
) -> ReviewResult<i32> {
    let user_id = identity.require_user()?;
    let review = form.validate(school_id, user_id)?;
    store.insert_review(review).await
}

/// Applies an admin decision through `ReviewStatus::transition`.
pub async fn moderate_review(
    store: &dyn ReviewStore,
    review_id: i32,
    identity: &Identity,
    action: ModerationAction,
) -> ReviewResult<ReviewStatus> {
    identity.require_user()?;
    if !identity.is_admin() {
        warn!("Non-admin user {:?} attempted to moderate review {}", identity.user_id, review_id);
        return Err(ReviewError::unauthorized("only admins may moderate reviews"));
    }
    let review_id = require_positive_id(review_id, "review_id")?;

    let review = store
        .fetch_review(review_id)
        .await?
        .ok_or_else(|| ReviewError::invalid(format!("review {review_id} does not exist")))?;
    let next = review.status.transition(action)?;

    if !store.update_status(review_id, next).await? {
        return Err(ReviewError::invalid(format!("review {review_id} does not exist")));
    }
    info!("Review {} moved from {} to {}", review_id, review.status.as_str(), next.as_str());
    Ok(next)
}
