use std::cmp::Ordering;

use tracing::debug;

use crate::db::models::rating::{
    CategoryAverage, CategoryScore, KeywordCount, KeywordFrequency, RatingBreakdown, RatingSummary,
};
use crate::db::models::review::{RatingCategory, Review};
use crate::db::store::{ReviewStore, StatusFilter};
use crate::error::{require_positive_id, ReviewResult};

/// Number of categories highlighted on the school page.
pub const TOP_CATEGORY_COUNT: usize = 3;

/// Category and overall averages over a school's approved reviews.
pub async fn compute_rating_breakdown(
    store: &dyn ReviewStore,
    school_id: i32,
) -> ReviewResult<RatingBreakdown> {
    let school_id = require_positive_id(school_id, "school_id")?;
    let reviews = store.fetch_reviews(school_id, StatusFilter::Approved).await?;
    debug!("Computing rating breakdown for school {} over {} reviews", school_id, reviews.len());
    Ok(breakdown_of(&reviews))
}

/// Breakdown plus overall display values and the top categories.
pub async fn compute_rating_summary(
    store: &dyn ReviewStore,
    school_id: i32,
) -> ReviewResult<RatingSummary> {
    let breakdown = compute_rating_breakdown(store, school_id).await?;
    Ok(RatingSummary {
        overall_rating: breakdown.overall.display(),
        review_count: breakdown.overall.count,
        top_categories: top_rating_categories(&breakdown, TOP_CATEGORY_COUNT),
        breakdown,
    })
}

/// Aggregates already-filtered reviews.
///
/// `overall` averages the stored per-review `overall_rating`; it is never
/// derived from the category averages.
pub fn breakdown_of(reviews: &[Review]) -> RatingBreakdown {
    let mut breakdown = RatingBreakdown {
        overall: CategoryAverage::from_values(reviews.iter().map(|r| r.overall_rating)),
        ..RatingBreakdown::default()
    };
    for category in RatingCategory::ALL {
        let average =
            CategoryAverage::from_values(reviews.iter().map(|r| f64::from(r.ratings.get(category))));
        breakdown.set(category, average);
    }
    breakdown
}

/// Best rated categories with at least one review; ties go to the larger count.
pub fn top_rating_categories(breakdown: &RatingBreakdown, n: usize) -> Vec<CategoryScore> {
    let mut scores: Vec<CategoryScore> = RatingCategory::ALL
        .iter()
        .map(|category| (*category, breakdown.get(*category)))
        .filter(|(_, avg)| avg.count > 0)
        .map(|(category, avg)| CategoryScore {
            category,
            label: category.label().to_string(),
            average: avg.average,
            count: avg.count,
        })
        .collect();

    scores.sort_by(|a, b| match b.average.total_cmp(&a.average) {
        Ordering::Equal => b.count.cmp(&a.count),
        other => other,
    });
    scores.truncate(n);
    scores
}

/// Counts, per vocabulary keyword, how many approved reviews mention it.
pub async fn extract_keyword_frequencies(
    store: &dyn ReviewStore,
    school_id: i32,
    vocabulary: &[String],
) -> ReviewResult<KeywordFrequency> {
    let school_id = require_positive_id(school_id, "school_id")?;
    let reviews = store.fetch_reviews(school_id, StatusFilter::Approved).await?;
    Ok(keyword_frequencies_of(&reviews, vocabulary))
}

/// Case-insensitive substring containment, one hit per review at most.
///
/// No word boundaries are enforced, so "art" also matches "party".
/// Keywords without hits are dropped; the rest are ordered by count, then by
/// their position in `vocabulary`.
pub fn keyword_frequencies_of(reviews: &[Review], vocabulary: &[String]) -> KeywordFrequency {
    let comments: Vec<String> = reviews
        .iter()
        .filter(|r| !r.comment.is_empty())
        .map(|r| r.comment.to_lowercase())
        .collect();

    let mut keywords: Vec<KeywordCount> = vocabulary
        .iter()
        .map(|keyword| keyword.trim().to_lowercase())
        .filter(|keyword| !keyword.is_empty())
        .map(|keyword| KeywordCount {
            reviews: comments.iter().filter(|c| c.contains(keyword.as_str())).count() as i64,
            keyword,
        })
        .filter(|k| k.reviews > 0)
        .collect();

    keywords.sort_by(|a, b| b.reviews.cmp(&a.reviews));
    KeywordFrequency { keywords }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryReviewStore;
    use crate::db::models::review::{CategoryRatings, ReviewStatus};
    use crate::error::ReviewError;
    use chrono::NaiveDate;

    fn review(id: i32, user_id: i32, scores: [u8; 6], status: ReviewStatus, comment: &str) -> Review {
        let ratings = CategoryRatings {
            location: scores[0],
            service: scores[1],
            facilities: scores[2],
            cleanliness: scores[3],
            value: scores[4],
            education: scores[5],
        };
        Review {
            id,
            school_id: 1,
            user_id,
            overall_rating: ratings.mean(),
            ratings,
            comment: comment.to_string(),
            photo_paths: vec![],
            status,
            created_at: NaiveDate::from_ymd_opt(2025, 1, 1)
                .and_then(|d| d.and_hms_opt(8, 0, id as u32))
                .unwrap(),
        }
    }

    fn vocabulary(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[tokio::test]
    async fn no_reviews_yields_zero_breakdown() {
        let store = MemoryReviewStore::new();
        store.seed(review(1, 9, [5; 6], ReviewStatus::Pending, "")).await;

        let breakdown = compute_rating_breakdown(&store, 1).await.unwrap();
        assert_eq!(breakdown.overall, CategoryAverage { average: 0.0, count: 0 });
        for category in RatingCategory::ALL {
            assert_eq!(breakdown.get(category), CategoryAverage { average: 0.0, count: 0 });
        }
    }

    #[tokio::test]
    async fn breakdown_only_counts_approved_reviews() {
        let store = MemoryReviewStore::new();
        store.seed(review(1, 1, [5, 4, 5, 5, 4, 5], ReviewStatus::Approved, "")).await;
        store.seed(review(2, 2, [3, 4, 3, 3, 3, 3], ReviewStatus::Approved, "")).await;
        store.seed(review(3, 3, [1, 1, 1, 1, 1, 1], ReviewStatus::Pending, "")).await;
        store.seed(review(4, 4, [1, 1, 1, 1, 1, 1], ReviewStatus::Rejected, "")).await;

        let breakdown = compute_rating_breakdown(&store, 1).await.unwrap();
        assert_eq!(breakdown.location, CategoryAverage { average: 4.0, count: 2 });
        assert_eq!(breakdown.service, CategoryAverage { average: 4.0, count: 2 });
        assert_eq!(breakdown.value.average, 3.5);
        assert_eq!(breakdown.overall.count, 2);
    }

    #[tokio::test]
    async fn overall_uses_stored_review_means() {
        let store = MemoryReviewStore::new();
        store.seed(review(1, 1, [5, 4, 5, 5, 4, 5], ReviewStatus::Approved, "")).await;
        store.seed(review(2, 2, [3; 6], ReviewStatus::Approved, "")).await;

        let breakdown = compute_rating_breakdown(&store, 1).await.unwrap();
        assert_eq!(breakdown.overall.count, 2);
        assert!((breakdown.overall.average - (28.0 / 6.0 + 3.0) / 2.0).abs() < 1e-9);
        assert!((breakdown.overall.average - 3.83).abs() < 0.01);
        assert_eq!(breakdown.location.average, 4.0);
    }

    #[test]
    fn overall_is_not_recomputed_from_categories() {
        let mut odd = review(1, 1, [5; 6], ReviewStatus::Approved, "");
        odd.overall_rating = 2.0;
        let breakdown = breakdown_of(&[odd]);
        assert_eq!(breakdown.location.average, 5.0);
        assert_eq!(breakdown.overall.average, 2.0);
    }

    #[tokio::test]
    async fn invalid_school_id_is_rejected() {
        let store = MemoryReviewStore::new();
        let err = compute_rating_breakdown(&store, 0).await.unwrap_err();
        assert!(matches!(err, ReviewError::InvalidArgument(_)));
    }

    #[test]
    fn top_categories_skip_empty_and_break_ties_by_count() {
        let mut breakdown = RatingBreakdown::default();
        breakdown.location = CategoryAverage { average: 4.5, count: 2 };
        breakdown.service = CategoryAverage { average: 4.5, count: 6 };
        breakdown.education = CategoryAverage { average: 4.9, count: 1 };
        breakdown.value = CategoryAverage { average: 3.0, count: 6 };

        let top = top_rating_categories(&breakdown, 3);
        let order: Vec<RatingCategory> = top.iter().map(|s| s.category).collect();
        assert_eq!(
            order,
            vec![RatingCategory::Education, RatingCategory::Service, RatingCategory::Location]
        );
        assert_eq!(top[0].label, "Education Quality");
        assert!(top_rating_categories(&RatingBreakdown::default(), 3).is_empty());
    }

    #[tokio::test]
    async fn summary_rounds_overall_for_display() {
        let store = MemoryReviewStore::new();
        store.seed(review(1, 1, [5, 4, 5, 5, 4, 5], ReviewStatus::Approved, "")).await;
        store.seed(review(2, 2, [3; 6], ReviewStatus::Approved, "")).await;

        let summary = compute_rating_summary(&store, 1).await.unwrap();
        assert_eq!(summary.overall_rating, 3.8);
        assert_eq!(summary.review_count, 2);
        assert_eq!(summary.top_categories.len(), 3);
    }

    #[tokio::test]
    async fn keyword_counts_distinct_approved_reviews() {
        let store = MemoryReviewStore::new();
        store
            .seed(review(1, 1, [5; 6], ReviewStatus::Approved, "Clean, so CLEAN, and friendly staff"))
            .await;
        store.seed(review(2, 2, [4; 6], ReviewStatus::Approved, "Quite expensive but clean")).await;
        store.seed(review(3, 3, [2; 6], ReviewStatus::Pending, "clean clean clean")).await;

        let vocab = vocabulary(&["clean", "Friendly", "expensive", "swimming"]);
        let frequencies = extract_keyword_frequencies(&store, 1, &vocab).await.unwrap();
        assert_eq!(frequencies.get("clean"), 2);
        assert_eq!(frequencies.get("friendly"), 1);
        assert_eq!(frequencies.get("expensive"), 1);
        assert_eq!(frequencies.get("swimming"), 0);
        assert_eq!(frequencies.keywords.len(), 3);
        assert_eq!(frequencies.keywords[0].keyword, "clean");
        // equal counts keep vocabulary order
        assert_eq!(frequencies.keywords[1].keyword, "friendly");
    }

    #[test]
    fn keyword_match_ignores_word_boundaries() {
        let reviews = vec![review(1, 1, [4; 6], ReviewStatus::Approved, "Great birthday party")];
        let frequencies = keyword_frequencies_of(&reviews, &vocabulary(&["art"]));
        assert_eq!(frequencies.get("art"), 1);
    }
}
