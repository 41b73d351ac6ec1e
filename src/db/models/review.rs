use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{require_positive_id, ReviewError, ReviewResult};

/// Maximum number of photo references attached to one review.
pub const MAX_REVIEW_PHOTOS: usize = 10;

/// The six scored aspects of a school.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RatingCategory {
    Location,
    Service,
    Facilities,
    Cleanliness,
    Value,
    Education,
}

impl RatingCategory {
    pub const ALL: [RatingCategory; 6] = [
        RatingCategory::Location,
        RatingCategory::Service,
        RatingCategory::Facilities,
        RatingCategory::Cleanliness,
        RatingCategory::Value,
        RatingCategory::Education,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RatingCategory::Location => "Location",
            RatingCategory::Service => "Service",
            RatingCategory::Facilities => "Facilities",
            RatingCategory::Cleanliness => "Cleanliness",
            RatingCategory::Value => "Value for Money",
            RatingCategory::Education => "Education Quality",
        }
    }
}

/// One review's six 1-5 scores.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
pub struct CategoryRatings {
    pub location: u8,
    pub service: u8,
    pub facilities: u8,
    pub cleanliness: u8,
    pub value: u8,
    pub education: u8,
}

impl CategoryRatings {
    pub fn get(&self, category: RatingCategory) -> u8 {
        match category {
            RatingCategory::Location => self.location,
            RatingCategory::Service => self.service,
            RatingCategory::Facilities => self.facilities,
            RatingCategory::Cleanliness => self.cleanliness,
            RatingCategory::Value => self.value,
            RatingCategory::Education => self.education,
        }
    }

    /// Arithmetic mean of the six scores; stored as the review's overall rating.
    pub fn mean(&self) -> f64 {
        let sum: u32 = RatingCategory::ALL.iter().map(|c| u32::from(self.get(*c))).sum();
        f64::from(sum) / RatingCategory::ALL.len() as f64
    }
}

/// Moderation state of a review
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

/// Admin decision applied to a review
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ModerationAction {
    Approve,
    Reject,
}

impl ReviewStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewStatus::Pending => "Pending",
            ReviewStatus::Approved => "Approved",
            ReviewStatus::Rejected => "Rejected",
        }
    }

    /// The only way a review changes state.
    ///
    /// Approve: Pending | Rejected -> Approved. Reject: Pending | Approved -> Rejected.
    /// Applying an action that leaves the status unchanged is rejected.
    pub fn transition(self, action: ModerationAction) -> ReviewResult<ReviewStatus> {
        match (self, action) {
            (ReviewStatus::Pending | ReviewStatus::Rejected, ModerationAction::Approve) => {
                Ok(ReviewStatus::Approved)
            }
            (ReviewStatus::Pending | ReviewStatus::Approved, ModerationAction::Reject) => {
                Ok(ReviewStatus::Rejected)
            }
            (status, action) => Err(ReviewError::invalid(format!(
                "cannot {action:?} a review that is already {}",
                status.as_str()
            ))),
        }
    }
}

impl TryFrom<&str> for ReviewStatus {
    type Error = ReviewError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Pending" => Ok(ReviewStatus::Pending),
            "Approved" => Ok(ReviewStatus::Approved),
            "Rejected" => Ok(ReviewStatus::Rejected),
            other => Err(ReviewError::Storage(format!("unknown review status {other:?}"))),
        }
    }
}

/// A stored school review
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct Review {
    pub id: i32,
    pub school_id: i32,
    pub user_id: i32,
    pub ratings: CategoryRatings,
    /// Mean of `ratings`, fixed at creation time.
    pub overall_rating: f64,
    pub comment: String,
    pub photo_paths: Vec<String>,
    pub status: ReviewStatus,
    pub created_at: NaiveDateTime,
}

/// Validated review ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub school_id: i32,
    pub user_id: i32,
    pub ratings: CategoryRatings,
    pub overall_rating: f64,
    pub comment: String,
    pub photo_paths: Vec<String>,
}

/// Review form as submitted by a parent
#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct ReviewForm {
    pub location_rating: i64,
    pub service_rating: i64,
    pub facilities_rating: i64,
    pub cleanliness_rating: i64,
    pub value_rating: i64,
    pub education_rating: i64,
    #[serde(default)]
    pub comment: Option<String>,
    /// References to photos already stored by the upload service
    #[serde(default)]
    pub photo_paths: Vec<String>,
}

impl ReviewForm {
    /// Checks every field and computes the stored overall rating.
    pub fn validate(self, school_id: i32, user_id: i32) -> ReviewResult<NewReview> {
        let school_id = require_positive_id(school_id, "school_id")?;

        let ratings = CategoryRatings {
            location: star_rating("location_rating", self.location_rating)?,
            service: star_rating("service_rating", self.service_rating)?,
            facilities: star_rating("facilities_rating", self.facilities_rating)?,
            cleanliness: star_rating("cleanliness_rating", self.cleanliness_rating)?,
            value: star_rating("value_rating", self.value_rating)?,
            education: star_rating("education_rating", self.education_rating)?,
        };

        if self.photo_paths.len() > MAX_REVIEW_PHOTOS {
            return Err(ReviewError::invalid(format!(
                "at most {MAX_REVIEW_PHOTOS} photos may be attached"
            )));
        }
        let photo_paths = self
            .photo_paths
            .into_iter()
            .map(|path| path.trim().to_string())
            .collect::<Vec<_>>();
        if photo_paths.iter().any(|path| path.is_empty()) {
            return Err(ReviewError::invalid("photo paths must not be empty"));
        }

        Ok(NewReview {
            school_id,
            user_id,
            overall_rating: ratings.mean(),
            ratings,
            comment: self.comment.unwrap_or_default().trim().to_string(),
            photo_paths,
        })
    }
}

fn star_rating(field: &str, value: i64) -> ReviewResult<u8> {
    match u8::try_from(value) {
        Ok(stars @ 1..=5) => Ok(stars),
        _ => Err(ReviewError::invalid(format!("{field} must be between 1 and 5 stars"))),
    }
}

/// Sort orders offered on the school page
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReviewSort {
    #[default]
    MostRecent,
    RatingHigh,
    RatingLow,
    MostHelpful,
}

impl ReviewSort {
    /// Unknown values fall back to `MostRecent`, as the school page always has.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("rating_high") => ReviewSort::RatingHigh,
            Some("rating_low") => ReviewSort::RatingLow,
            Some("most_helpful") => ReviewSort::MostHelpful,
            _ => ReviewSort::MostRecent,
        }
    }
}

/// Raw query string of the review listing endpoint
#[derive(Deserialize, Debug, Default, Clone, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListingParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// most_recent | rating_high | rating_low | most_helpful
    pub sort: Option<String>,
    /// Restrict to comments containing this text; disables pagination
    pub keyword: Option<String>,
}

/// Validated listing request
#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    pub school_id: i32,
    pub limit: usize,
    pub offset: usize,
    pub sort: ReviewSort,
    pub keyword: Option<String>,
}

impl ListingParams {
    pub fn validate(self, school_id: i32, default_limit: i64, max_limit: i64) -> ReviewResult<ListingQuery> {
        let school_id = require_positive_id(school_id, "school_id")?;

        let limit = self.limit.unwrap_or(default_limit);
        if limit < 1 || limit > max_limit {
            return Err(ReviewError::invalid(format!("limit must be between 1 and {max_limit}")));
        }
        let offset = self.offset.unwrap_or(0);
        if offset < 0 {
            return Err(ReviewError::invalid("offset must not be negative"));
        }

        let keyword = self
            .keyword
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        Ok(ListingQuery {
            school_id,
            limit: limit as usize,
            offset: offset as usize,
            sort: ReviewSort::parse(self.sort.as_deref()),
            keyword,
        })
    }
}

/// A review as shown in a listing
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct ListedReview {
    #[serde(flatten)]
    pub review: Review,
    pub helpful_count: i64,
    /// Whether the requesting user has marked this review helpful
    pub user_marked_helpful: bool,
}

/// One page of reviews
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct ReviewPage {
    pub reviews: Vec<ListedReview>,
    /// Every review visible to the requester (after keyword filtering)
    pub total_count: usize,
    pub has_more: bool,
    pub loaded: usize,
}

/// Status change request from the admin panel
#[derive(Deserialize, Debug, ToSchema)]
pub struct ModerationRequest {
    pub action: ModerationAction,
}
