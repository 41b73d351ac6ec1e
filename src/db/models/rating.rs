use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::review::RatingCategory;

/// Mean score and number of reviews behind it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default, ToSchema)]
pub struct CategoryAverage {
    /// Full precision mean
    pub average: f64,
    pub count: i64,
}

impl CategoryAverage {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let (sum, count) = values
            .into_iter()
            .fold((0.0, 0i64), |(sum, count), v| (sum + v, count + 1));
        if count == 0 {
            return CategoryAverage::default();
        }
        CategoryAverage {
            average: sum / count as f64,
            count,
        }
    }

    /// Rounded to one decimal place for display.
    pub fn display(&self) -> f64 {
        (self.average * 10.0).round() / 10.0
    }
}

/// Per-school aggregate over approved reviews
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, ToSchema)]
pub struct RatingBreakdown {
    pub location: CategoryAverage,
    pub service: CategoryAverage,
    pub facilities: CategoryAverage,
    pub cleanliness: CategoryAverage,
    pub value: CategoryAverage,
    pub education: CategoryAverage,
    /// Mean of the stored per-review overall ratings
    pub overall: CategoryAverage,
}

impl RatingBreakdown {
    pub fn get(&self, category: RatingCategory) -> CategoryAverage {
        match category {
            RatingCategory::Location => self.location,
            RatingCategory::Service => self.service,
            RatingCategory::Facilities => self.facilities,
            RatingCategory::Cleanliness => self.cleanliness,
            RatingCategory::Value => self.value,
            RatingCategory::Education => self.education,
        }
    }

    pub(crate) fn set(&mut self, category: RatingCategory, value: CategoryAverage) {
        let slot = match category {
            RatingCategory::Location => &mut self.location,
            RatingCategory::Service => &mut self.service,
            RatingCategory::Facilities => &mut self.facilities,
            RatingCategory::Cleanliness => &mut self.cleanliness,
            RatingCategory::Value => &mut self.value,
            RatingCategory::Education => &mut self.education,
        };
        *slot = value;
    }
}

/// A highlighted category on the school page
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct CategoryScore {
    pub category: RatingCategory,
    pub label: String,
    pub average: f64,
    pub count: i64,
}

/// Breakdown plus the display fields the school page needs
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct RatingSummary {
    pub breakdown: RatingBreakdown,
    pub overall_rating: f64,
    pub review_count: i64,
    pub top_categories: Vec<CategoryScore>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct KeywordCount {
    pub keyword: String,
    /// Number of approved reviews mentioning the keyword
    pub reviews: i64,
}

/// Keywords found in a school's approved reviews, most frequent first.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, ToSchema)]
pub struct KeywordFrequency {
    pub keywords: Vec<KeywordCount>,
}

impl KeywordFrequency {
    pub fn get(&self, keyword: &str) -> i64 {
        self.keywords
            .iter()
            .find(|k| k.keyword.eq_ignore_ascii_case(keyword))
            .map_or(0, |k| k.reviews)
    }

    pub fn truncate(&mut self, top: usize) {
        self.keywords.truncate(top);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_average_is_zero() {
        let avg = CategoryAverage::from_values(std::iter::empty());
        assert_eq!(avg.count, 0);
        assert_eq!(avg.average, 0.0);
    }

    #[test]
    fn display_rounds_to_one_decimal() {
        let avg = CategoryAverage::from_values([28.0 / 6.0, 3.0]);
        assert!((avg.average - 3.833_333).abs() < 1e-5);
        assert_eq!(avg.display(), 3.8);
    }
}
