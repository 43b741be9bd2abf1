//! Business entities, reviews, and the aggregate rating rule.
//!
//! The aggregate calculator is deliberately free of I/O so the tier rule can
//! be exercised without a store. Serde field names follow the persisted
//! document shape (camelCase).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::ids::{BusinessId, ReviewId, UserId};

/// Discrete reputation label derived from the aggregate rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingTier {
    /// Default tier, including businesses with no reviews yet.
    Silver,
    Gold,
    Platinum,
}

impl fmt::Display for RatingTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Silver => "silver",
            Self::Gold => "gold",
            Self::Platinum => "platinum",
        };
        f.write_str(label)
    }
}

/// Snapshot of a business's aggregate review state.
///
/// ## Invariants
/// - `count` equals the number of reviews the snapshot was computed from.
/// - `score` is `0.0` exactly when `count` is zero, otherwise the
///   full-precision arithmetic mean of the ratings (no rounding here;
///   presentation rounding is a client concern).
/// - `tier` is always the tier implied by `(score, count)` under
///   [`RatingTier`] thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingAggregate {
    pub score: f64,
    pub count: u32,
    pub tier: RatingTier,
}

impl RatingAggregate {
    fn tier_for(score: f64, count: u32) -> RatingTier {
        // First match wins; thresholds are non-decreasing so raising either
        // input can never lower the tier.
        if score >= 4.5 && count >= 100 {
            RatingTier::Platinum
        } else if score >= 4.0 && count >= 50 {
            RatingTier::Gold
        } else {
            RatingTier::Silver
        }
    }
}

/// Recompute the aggregate rating from the full review sequence.
pub fn compute_aggregate(reviews: &[Review]) -> RatingAggregate {
    let count = reviews.len() as u32;
    let score = if reviews.is_empty() {
        0.0
    } else {
        let sum: u64 = reviews.iter().map(|r| u64::from(r.rating)).sum();
        sum as f64 / reviews.len() as f64
    };
    RatingAggregate {
        score,
        count,
        tier: RatingAggregate::tier_for(score, count),
    }
}

/// Validation failures for review submissions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewValidationError {
    /// Rating must be an integer between 1 and 5 inclusive.
    #[error("rating must be between 1 and 5")]
    RatingOutOfRange,
    /// Comment must contain non-whitespace text.
    #[error("comment must not be empty")]
    EmptyComment,
}

/// A single immutable review appended to a business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied review payload before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    pub rating: i64,
    pub comment: String,
}

impl Review {
    /// Validate a draft and mint the review that will be appended.
    ///
    /// The identifier is assigned here; reviews have no update or delete
    /// path once appended.
    pub fn from_draft(
        id: ReviewId,
        user_id: UserId,
        draft: ReviewDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ReviewValidationError> {
        if !(1..=5).contains(&draft.rating) {
            return Err(ReviewValidationError::RatingOutOfRange);
        }
        if draft.comment.trim().is_empty() {
            return Err(ReviewValidationError::EmptyComment);
        }
        Ok(Self {
            id,
            user_id,
            rating: draft.rating as u8,
            comment: draft.comment,
            created_at,
        })
    }
}

/// A directory business with its embedded reviews and aggregate fields.
///
/// `rating_score`, `review_count`, and `rating_tier` are redundant with
/// `reviews` but persisted for fast reads; every append recomputes and
/// writes all three together with the review list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    pub id: BusinessId,
    pub owner_id: UserId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub reviews: Vec<Review>,
    pub rating_score: f64,
    pub review_count: u32,
    pub rating_tier: RatingTier,
    #[serde(default)]
    pub is_pinned: bool,
    pub created_at: DateTime<Utc>,
}

/// Validation failures for business payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BusinessValidationError {
    /// Name must contain non-whitespace text.
    #[error("business name must not be empty")]
    EmptyName,
    /// Category must contain non-whitespace text.
    #[error("category must not be empty")]
    EmptyCategory,
}

/// Payload for creating a business; the caller becomes the owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessDraft {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub city: String,
    pub state: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl BusinessDraft {
    /// Reject drafts that cannot become a listable business.
    pub fn validate(&self) -> Result<(), BusinessValidationError> {
        if self.name.trim().is_empty() {
            return Err(BusinessValidationError::EmptyName);
        }
        if self.category.trim().is_empty() {
            return Err(BusinessValidationError::EmptyCategory);
        }
        Ok(())
    }
}

/// Owner-initiated partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_pinned: Option<bool>,
}

impl BusinessChanges {
    /// Reject updates that would blank out fields creation validates.
    pub fn validate(&self) -> Result<(), BusinessValidationError> {
        if self.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(BusinessValidationError::EmptyName);
        }
        if self
            .category
            .as_deref()
            .is_some_and(|category| category.trim().is_empty())
        {
            return Err(BusinessValidationError::EmptyCategory);
        }
        Ok(())
    }

    /// True when the update carries nothing to apply.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.address.is_none()
            && self.phone.is_none()
            && self.is_pinned.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn review(rating: u8) -> Review {
        Review {
            id: ReviewId::new(format!("r-{rating}")).expect("id"),
            user_id: UserId::new("u1").expect("id"),
            rating,
            comment: "fine".into(),
            created_at: Utc::now(),
        }
    }

    fn reviews(ratings: &[u8]) -> Vec<Review> {
        ratings.iter().copied().map(review).collect()
    }

    #[test]
    fn empty_review_list_is_silver_with_zero_score() {
        let agg = compute_aggregate(&[]);
        assert_eq!(agg.score, 0.0);
        assert_eq!(agg.count, 0);
        assert_eq!(agg.tier, RatingTier::Silver);
    }

    #[test]
    fn count_always_matches_the_review_list() {
        for n in [0usize, 1, 7, 120] {
            let list = reviews(&vec![4; n]);
            assert_eq!(compute_aggregate(&list).count, n as u32);
        }
    }

    #[test]
    fn score_is_the_full_precision_mean() {
        let agg = compute_aggregate(&reviews(&[5, 4, 4]));
        assert!((agg.score - 13.0 / 3.0).abs() < f64::EPSILON);
    }

    #[rstest]
    // score meets platinum but count does not
    #[case(&[5; 99], RatingTier::Gold)]
    // both thresholds met
    #[case(&[5; 100], RatingTier::Platinum)]
    // count meets gold, score does not
    #[case(&[3; 60], RatingTier::Silver)]
    #[case(&[4; 50], RatingTier::Gold)]
    #[case(&[4; 49], RatingTier::Silver)]
    #[case(&[5; 1], RatingTier::Silver)]
    fn tier_rule_applies_in_precedence_order(#[case] ratings: &[u8], #[case] expected: RatingTier) {
        assert_eq!(compute_aggregate(&reviews(ratings)).tier, expected);
    }

    #[test]
    fn adding_reviews_at_the_same_score_never_lowers_the_tier() {
        // Hold the mean at 5.0 and grow the count: silver -> gold -> platinum.
        let mut last = RatingTier::Silver;
        for n in [1usize, 50, 100, 150] {
            let tier = compute_aggregate(&reviews(&vec![5; n])).tier;
            assert!(tier >= last, "tier dropped from {last} at count {n}");
            last = tier;
        }
    }

    #[test]
    fn hundredth_review_promotes_only_if_the_true_mean_clears_the_bar() {
        // 99 reviews averaging just under 4.5, then a 5: mean stays below
        // 4.5, so the count threshold alone must not promote to platinum.
        let mut list = reviews(&[4; 55]);
        list.extend(reviews(&vec![5; 44]));
        let before = compute_aggregate(&list);
        assert_eq!(before.count, 99);
        assert!(before.score < 4.5);

        list.push(review(5));
        let after = compute_aggregate(&list);
        assert_eq!(after.count, 100);
        assert!(after.score < 4.5);
        assert_eq!(after.tier, RatingTier::Gold);

        // With a higher starting mean the same append does promote.
        let mut strong = reviews(&vec![5; 90]);
        strong.extend(reviews(&[4; 9]));
        strong.push(review(5));
        let promoted = compute_aggregate(&strong);
        assert_eq!(promoted.count, 100);
        assert!(promoted.score >= 4.5);
        assert_eq!(promoted.tier, RatingTier::Platinum);
    }

    #[rstest]
    #[case(0, "ok", ReviewValidationError::RatingOutOfRange)]
    #[case(6, "ok", ReviewValidationError::RatingOutOfRange)]
    #[case(-1, "ok", ReviewValidationError::RatingOutOfRange)]
    #[case(3, "", ReviewValidationError::EmptyComment)]
    #[case(3, "   ", ReviewValidationError::EmptyComment)]
    fn invalid_drafts_are_rejected(
        #[case] rating: i64,
        #[case] comment: &str,
        #[case] expected: ReviewValidationError,
    ) {
        let result = Review::from_draft(
            ReviewId::new("r").expect("id"),
            UserId::new("u").expect("id"),
            ReviewDraft {
                rating,
                comment: comment.into(),
            },
            Utc::now(),
        );
        assert_eq!(result, Err(expected));
    }

    #[rstest]
    #[case(Some("   "), None, Err(BusinessValidationError::EmptyName))]
    #[case(None, Some(""), Err(BusinessValidationError::EmptyCategory))]
    #[case(Some("Mama Put"), Some("food"), Ok(()))]
    #[case(None, None, Ok(()))]
    fn changes_reject_blank_values_but_allow_absent_ones(
        #[case] name: Option<&str>,
        #[case] category: Option<&str>,
        #[case] expected: Result<(), BusinessValidationError>,
    ) {
        let changes = BusinessChanges {
            name: name.map(str::to_owned),
            category: category.map(str::to_owned),
            ..BusinessChanges::default()
        };
        assert_eq!(changes.validate(), expected);
    }

    #[test]
    fn business_documents_use_camel_case_fields() {
        let business = Business {
            id: BusinessId::new("b1").expect("id"),
            owner_id: UserId::new("u1").expect("id"),
            name: "Mama Put Kitchen".into(),
            description: None,
            category: "Restaurant".into(),
            city: "Lagos".into(),
            state: "Lagos".into(),
            address: None,
            phone: None,
            reviews: Vec::new(),
            rating_score: 0.0,
            review_count: 0,
            rating_tier: RatingTier::Silver,
            is_pinned: false,
            created_at: Utc::now(),
        };
        let doc = serde_json::to_value(&business).expect("serializable");
        assert_eq!(doc["ratingScore"], 0.0);
        assert_eq!(doc["reviewCount"], 0);
        assert_eq!(doc["ratingTier"], "silver");
        assert_eq!(doc["ownerId"], "u1");
    }
}
