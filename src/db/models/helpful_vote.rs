use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A user's helpful marker on a review; at most one per (review, user).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, FromRow, ToSchema)]
pub struct HelpfulVote {
    pub id: i32,
    pub review_id: i32,
    pub user_id: i32,
    pub is_helpful: bool,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HelpfulAction {
    Helpful,
    Unhelpful,
}

impl HelpfulAction {
    pub fn wants_helpful(self) -> bool {
        matches!(self, HelpfulAction::Helpful)
    }
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct HelpfulVoteRequest {
    pub action: HelpfulAction,
}

/// Outcome of a vote toggle
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
pub struct HelpfulVoteResult {
    pub helpful_count: i64,
    pub is_helpful: bool,
}
