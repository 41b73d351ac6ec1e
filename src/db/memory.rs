use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::db::models::helpful_vote::HelpfulVote;
use crate::db::models::review::{NewReview, Review, ReviewStatus};
use crate::db::store::{HelpfulVoteStore, ReviewStore, StatusFilter};
use crate::error::ReviewResult;

#[derive(Default)]
struct ReviewTable {
    rows: Vec<Review>,
    last_id: i32,
}

/// Process-local review store for tests and database-less development.
#[derive(Default)]
pub struct MemoryReviewStore {
    table: Mutex<ReviewTable>,
}

impl MemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a fully formed review as-is (status and timestamp included).
    pub async fn seed(&self, review: Review) {
        let mut table = self.table.lock().await;
        table.last_id = table.last_id.max(review.id);
        table.rows.retain(|r| r.id != review.id);
        table.rows.push(review);
    }
}

#[async_trait]
impl ReviewStore for MemoryReviewStore {
    async fn fetch_reviews(&self, school_id: i32, filter: StatusFilter) -> ReviewResult<Vec<Review>> {
        let table = self.table.lock().await;
        let mut reviews: Vec<Review> = table
            .rows
            .iter()
            .filter(|r| r.school_id == school_id && filter.admits(r))
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(reviews)
    }

    async fn fetch_review(&self, review_id: i32) -> ReviewResult<Option<Review>> {
        let table = self.table.lock().await;
        Ok(table.rows.iter().find(|r| r.id == review_id).cloned())
    }

    async fn insert_review(&self, review: NewReview) -> ReviewResult<i32> {
        let mut table = self.table.lock().await;
        table.last_id += 1;
        let id = table.last_id;
        table.rows.push(Review {
            id,
            school_id: review.school_id,
            user_id: review.user_id,
            ratings: review.ratings,
            overall_rating: review.overall_rating,
            comment: review.comment,
            photo_paths: review.photo_paths,
            status: ReviewStatus::Pending,
            created_at: Utc::now().naive_utc(),
        });
        Ok(id)
    }

    async fn update_status(&self, review_id: i32, status: ReviewStatus) -> ReviewResult<bool> {
        let mut table = self.table.lock().await;
        match table.rows.iter_mut().find(|r| r.id == review_id) {
            Some(review) => {
                review.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> ReviewResult<()> {
        Ok(())
    }
}

#[derive(Default)]
struct VoteTable {
    rows: HashMap<(i32, i32), HelpfulVote>,
    last_id: i32,
}

/// Process-local vote store keyed by (review_id, user_id).
#[derive(Default)]
pub struct MemoryHelpfulVoteStore {
    table: Mutex<VoteTable>,
}

impl MemoryHelpfulVoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All vote rows for a review, in no particular order.
    pub async fn rows_for(&self, review_id: i32) -> Vec<HelpfulVote> {
        let table = self.table.lock().await;
        table
            .rows
            .values()
            .filter(|v| v.review_id == review_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl HelpfulVoteStore for MemoryHelpfulVoteStore {
    async fn fetch_vote(&self, review_id: i32, user_id: i32) -> ReviewResult<Option<HelpfulVote>> {
        let table = self.table.lock().await;
        Ok(table.rows.get(&(review_id, user_id)).cloned())
    }

    async fn upsert_vote(&self, review_id: i32, user_id: i32, is_helpful: bool) -> ReviewResult<()> {
        let mut table = self.table.lock().await;
        let now = Utc::now().naive_utc();
        if let Some(vote) = table.rows.get_mut(&(review_id, user_id)) {
            vote.is_helpful = is_helpful;
            vote.updated_at = now;
            return Ok(());
        }
        table.last_id += 1;
        let id = table.last_id;
        table.rows.insert(
            (review_id, user_id),
            HelpfulVote {
                id,
                review_id,
                user_id,
                is_helpful,
                updated_at: now,
            },
        );
        Ok(())
    }

    async fn delete_vote(&self, vote_id: i32) -> ReviewResult<()> {
        let mut table = self.table.lock().await;
        table.rows.retain(|_, vote| vote.id != vote_id);
        Ok(())
    }

    async fn count_helpful(&self, review_id: i32) -> ReviewResult<i64> {
        let table = self.table.lock().await;
        Ok(table
            .rows
            .values()
            .filter(|v| v.review_id == review_id && v.is_helpful)
            .count() as i64)
    }

    async fn count_helpful_many(&self, review_ids: &[i32]) -> ReviewResult<HashMap<i32, i64>> {
        let table = self.table.lock().await;
        let mut counts = HashMap::new();
        for vote in table.rows.values() {
            if vote.is_helpful && review_ids.contains(&vote.review_id) {
                *counts.entry(vote.review_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    async fn voted_helpful(&self, review_ids: &[i32], user_id: i32) -> ReviewResult<HashSet<i32>> {
        let table = self.table.lock().await;
        Ok(review_ids
            .iter()
            .copied()
            .filter(|id| matches!(table.rows.get(&(*id, user_id)), Some(v) if v.is_helpful))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::review::CategoryRatings;

    fn new_review(school_id: i32, user_id: i32) -> NewReview {
        let ratings = CategoryRatings {
            location: 4,
            service: 4,
            facilities: 4,
            cleanliness: 4,
            value: 4,
            education: 4,
        };
        NewReview {
            school_id,
            user_id,
            overall_rating: ratings.mean(),
            ratings,
            comment: String::new(),
            photo_paths: vec![],
        }
    }

    #[tokio::test]
    async fn inserted_reviews_start_pending() {
        let store = MemoryReviewStore::new();
        let id = store.insert_review(new_review(1, 5)).await.unwrap();
        let review = store.fetch_review(id).await.unwrap().unwrap();
        assert_eq!(review.status, ReviewStatus::Pending);

        assert!(store.fetch_reviews(1, StatusFilter::Approved).await.unwrap().is_empty());
        assert_eq!(store.fetch_reviews(1, StatusFilter::VisibleTo(5)).await.unwrap().len(), 1);
        assert!(store.fetch_reviews(1, StatusFilter::VisibleTo(6)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn status_update_reports_missing_rows() {
        let store = MemoryReviewStore::new();
        let id = store.insert_review(new_review(1, 5)).await.unwrap();
        assert!(store.update_status(id, ReviewStatus::Approved).await.unwrap());
        assert!(!store.update_status(id + 100, ReviewStatus::Approved).await.unwrap());
    }

    #[tokio::test]
    async fn upsert_keeps_one_row_per_pair() {
        let votes = MemoryHelpfulVoteStore::new();
        votes.upsert_vote(1, 2, false).await.unwrap();
        votes.upsert_vote(1, 2, true).await.unwrap();
        votes.upsert_vote(1, 2, true).await.unwrap();
        let rows = votes.rows_for(1).await;
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_helpful);
        assert_eq!(votes.count_helpful(1).await.unwrap(), 1);

        votes.delete_vote(rows[0].id).await.unwrap();
        votes.delete_vote(rows[0].id).await.unwrap();
        assert_eq!(votes.count_helpful(1).await.unwrap(), 0);
    }
}
