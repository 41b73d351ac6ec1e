use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::models::helpful_vote::HelpfulVote;
use crate::db::store::HelpfulVoteStore;
use crate::error::ReviewResult;

/// `HelpfulVoteStore` backed by `review_helpful_votes`.
///
/// The table carries `UNIQUE (review_id, user_id)`; writes go through
/// `ON CONFLICT` so concurrent submissions from one user converge on a
/// single row.
#[derive(Clone)]
pub struct PgHelpfulVoteStore {
    pool: PgPool,
}

impl PgHelpfulVoteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HelpfulVoteStore for PgHelpfulVoteStore {
    async fn fetch_vote(&self, review_id: i32, user_id: i32) -> ReviewResult<Option<HelpfulVote>> {
        let vote = sqlx::query_as::<_, HelpfulVote>(
            r#"
            SELECT id, review_id, user_id, is_helpful, updated_at
            FROM review_helpful_votes
            WHERE review_id = $1 AND user_id = $2
            "#,
        )
        .bind(review_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(vote)
    }

    async fn upsert_vote(&self, review_id: i32, user_id: i32, is_helpful: bool) -> ReviewResult<()> {
        sqlx::query(
            r#"
            INSERT INTO review_helpful_votes (review_id, user_id, is_helpful, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (review_id, user_id)
            DO UPDATE SET is_helpful = EXCLUDED.is_helpful, updated_at = NOW()
            "#,
        )
        .bind(review_id)
        .bind(user_id)
        .bind(is_helpful)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_vote(&self, vote_id: i32) -> ReviewResult<()> {
        sqlx::query("DELETE FROM review_helpful_votes WHERE id = $1")
            .bind(vote_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count_helpful(&self, review_id: i32) -> ReviewResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM review_helpful_votes WHERE review_id = $1 AND is_helpful",
        )
        .bind(review_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn count_helpful_many(&self, review_ids: &[i32]) -> ReviewResult<HashMap<i32, i64>> {
        if review_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(i32, i64)> = sqlx::query_as(
            r#"
            SELECT review_id, COUNT(*)
            FROM review_helpful_votes
            WHERE review_id = ANY($1) AND is_helpful
            GROUP BY review_id
            "#,
        )
        .bind(review_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }

    async fn voted_helpful(&self, review_ids: &[i32], user_id: i32) -> ReviewResult<HashSet<i32>> {
        if review_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let ids: Vec<i32> = sqlx::query_scalar(
            r#"
            SELECT review_id
            FROM review_helpful_votes
            WHERE review_id = ANY($1) AND user_id = $2 AND is_helpful
            "#,
        )
        .bind(review_ids)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().collect())
    }
}
