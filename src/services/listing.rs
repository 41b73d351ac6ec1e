use std::cmp::Ordering;

use tracing::debug;

use crate::db::models::review::{ListedReview, ListingQuery, ReviewPage, ReviewSort};
use crate::db::store::{HelpfulVoteStore, ReviewStore, StatusFilter};
use crate::error::{require_positive_id, ReviewResult};
use crate::identity::Identity;

/// One page of a school's reviews as seen by `viewer`.
///
/// Approved reviews are visible to everyone; a viewer also sees their own
/// reviews in any state, grouped ahead of everyone else's. With a keyword the
/// whole filtered set comes back in one page.
pub async fn compute_review_listing(
    reviews: &dyn ReviewStore,
    votes: &dyn HelpfulVoteStore,
    query: &ListingQuery,
    viewer: &Identity,
) -> ReviewResult<ReviewPage> {
    let school_id = require_positive_id(query.school_id, "school_id")?;
    let mut visible = reviews
        .fetch_reviews(school_id, StatusFilter::for_viewer(viewer.user_id))
        .await?;

    if let Some(keyword) = &query.keyword {
        let needle = keyword.to_lowercase();
        visible.retain(|r| r.comment.to_lowercase().contains(&needle));
    }

    let ids: Vec<i32> = visible.iter().map(|r| r.id).collect();
    let counts = votes.count_helpful_many(&ids).await?;
    let marked = match viewer.user_id {
        Some(user_id) => votes.voted_helpful(&ids, user_id).await?,
        None => Default::default(),
    };

    let listed: Vec<ListedReview> = visible
        .into_iter()
        .map(|review| ListedReview {
            helpful_count: counts.get(&review.id).copied().unwrap_or(0),
            user_marked_helpful: marked.contains(&review.id),
            review,
        })
        .collect();

    let sorted = sort_own_first(listed, viewer.user_id, query.sort);
    let total_count = sorted.len();

    let (page, offset, has_more) = if query.keyword.is_some() {
        (sorted, 0, false)
    } else {
        let page: Vec<ListedReview> = sorted.into_iter().skip(query.offset).take(query.limit).collect();
        let has_more = total_count > query.offset + page.len();
        (page, query.offset, has_more)
    };

    debug!(
        "Listing school {}: {} of {} reviews (sort {:?}, keyword {:?})",
        school_id,
        page.len(),
        total_count,
        query.sort,
        query.keyword
    );

    Ok(ReviewPage {
        loaded: offset + page.len(),
        reviews: page,
        total_count,
        has_more,
    })
}

/// Puts the viewer's own reviews first and sorts each group on its own.
pub fn sort_own_first(
    reviews: Vec<ListedReview>,
    viewer: Option<i32>,
    sort: ReviewSort,
) -> Vec<ListedReview> {
    let (mut own, mut others): (Vec<_>, Vec<_>) = reviews
        .into_iter()
        .partition(|r| viewer == Some(r.review.user_id));

    own.sort_by(|a, b| compare(sort, a, b));
    others.sort_by(|a, b| compare(sort, a, b));
    own.extend(others);
    own
}

fn newest_first(a: &ListedReview, b: &ListedReview) -> Ordering {
    b.review.created_at.cmp(&a.review.created_at)
}

fn compare(sort: ReviewSort, a: &ListedReview, b: &ListedReview) -> Ordering {
    let (ra, rb) = (a.review.overall_rating, b.review.overall_rating);
    match sort {
        ReviewSort::MostRecent => newest_first(a, b),
        ReviewSort::RatingHigh => rb.total_cmp(&ra).then_with(|| newest_first(a, b)),
        ReviewSort::RatingLow => ra.total_cmp(&rb).then_with(|| newest_first(a, b)),
        ReviewSort::MostHelpful => b
            .helpful_count
            .cmp(&a.helpful_count)
            .then_with(|| rb.total_cmp(&ra))
            .then_with(|| newest_first(a, b)),
    }
}
