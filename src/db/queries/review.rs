use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};

use crate::db::models::review::{CategoryRatings, NewReview, Review, ReviewStatus};
use crate::db::store::{ReviewStore, StatusFilter};
use crate::error::{ReviewError, ReviewResult};

const REVIEW_COLUMNS: &str = r#"
    id, school_id, user_id,
    location_rating, service_rating, facilities_rating,
    cleanliness_rating, value_rating, education_rating,
    overall_rating, comment, photo_paths, status, created_at
"#;

/// Row shape of `school_reviews`
#[derive(Debug, FromRow)]
struct ReviewRow {
    id: i32,
    school_id: i32,
    user_id: i32,
    location_rating: i16,
    service_rating: i16,
    facilities_rating: i16,
    cleanliness_rating: i16,
    value_rating: i16,
    education_rating: i16,
    overall_rating: f64,
    comment: String,
    photo_paths: Vec<String>,
    status: String,
    created_at: NaiveDateTime,
}

fn stored_rating(column: &str, value: i16) -> ReviewResult<u8> {
    u8::try_from(value)
        .ok()
        .filter(|stars| (1..=5).contains(stars))
        .ok_or_else(|| ReviewError::Storage(format!("{column} out of range: {value}")))
}

impl TryFrom<ReviewRow> for Review {
    type Error = ReviewError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        Ok(Review {
            id: row.id,
            school_id: row.school_id,
            user_id: row.user_id,
            ratings: CategoryRatings {
                location: stored_rating("location_rating", row.location_rating)?,
                service: stored_rating("service_rating", row.service_rating)?,
                facilities: stored_rating("facilities_rating", row.facilities_rating)?,
                cleanliness: stored_rating("cleanliness_rating", row.cleanliness_rating)?,
                value: stored_rating("value_rating", row.value_rating)?,
                education: stored_rating("education_rating", row.education_rating)?,
            },
            overall_rating: row.overall_rating,
            comment: row.comment,
            photo_paths: row.photo_paths,
            status: ReviewStatus::try_from(row.status.as_str())?,
            created_at: row.created_at,
        })
    }
}

/// `ReviewStore` backed by the `school_reviews` table
#[derive(Clone)]
pub struct PgReviewStore {
    pool: PgPool,
}

impl PgReviewStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewStore for PgReviewStore {
    async fn fetch_reviews(&self, school_id: i32, filter: StatusFilter) -> ReviewResult<Vec<Review>> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT ");
        query.push(REVIEW_COLUMNS);
        query.push(" FROM school_reviews WHERE school_id = ");
        query.push_bind(school_id);

        match filter {
            StatusFilter::Approved => {
                query.push(" AND status = ");
                query.push_bind(ReviewStatus::Approved.as_str());
            }
            StatusFilter::VisibleTo(user_id) => {
                query.push(" AND (status = ");
                query.push_bind(ReviewStatus::Approved.as_str());
                query.push(" OR user_id = ");
                query.push_bind(user_id);
                query.push(")");
            }
        }
        query.push(" ORDER BY created_at DESC, id DESC");

        let rows = query
            .build_query_as::<ReviewRow>()
            .fetch_all(&self.pool)
            .await?;
        debug!("Fetched {} reviews for school {} ({:?})", rows.len(), school_id, filter);

        rows.into_iter().map(Review::try_from).collect()
    }

    async fn fetch_review(&self, review_id: i32) -> ReviewResult<Option<Review>> {
        let sql = format!("SELECT {REVIEW_COLUMNS} FROM school_reviews WHERE id = $1");
        let row = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(review_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Review::try_from).transpose()
    }

    async fn insert_review(&self, review: NewReview) -> ReviewResult<i32> {
        let ratings = review.ratings;
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO school_reviews (
                school_id, user_id,
                location_rating, service_rating, facilities_rating,
                cleanliness_rating, value_rating, education_rating,
                overall_rating, comment, photo_paths, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, NOW())
            RETURNING id
            "#,
        )
        .bind(review.school_id)
        .bind(review.user_id)
        .bind(i16::from(ratings.location))
        .bind(i16::from(ratings.service))
        .bind(i16::from(ratings.facilities))
        .bind(i16::from(ratings.cleanliness))
        .bind(i16::from(ratings.value))
        .bind(i16::from(ratings.education))
        .bind(review.overall_rating)
        .bind(&review.comment)
        .bind(&review.photo_paths)
        .bind(ReviewStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await?;

        info!("Review {} submitted for school {} by user {}", id, review.school_id, review.user_id);
        Ok(id)
    }

    async fn update_status(&self, review_id: i32, status: ReviewStatus) -> ReviewResult<bool> {
        let result = sqlx::query("UPDATE school_reviews SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(review_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> ReviewResult<()> {
        sqlx::query("SELECT 1 FROM school_reviews LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(())
    }
}
