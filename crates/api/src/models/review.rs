//! Product review types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{ProductId, Rating, ReviewId, UserId};

use super::{ValidationError, optional_text, required_text};

/// The author of a review as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewAuthor {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
}

/// A review with its author embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: ReviewId,
    pub user: ReviewAuthor,
    pub product: ProductId,
    pub rating: Rating,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Review row joined with its author's name.
#[derive(Debug, sqlx::FromRow)]
pub struct ReviewRow {
    pub id: ReviewId,
    pub user_id: UserId,
    pub user_name: String,
    pub product_id: ProductId,
    pub rating: Rating,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            user: ReviewAuthor {
                id: row.user_id,
                name: row.user_name,
            },
            product: row.product_id,
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

/// Request body for posting a review.
#[derive(Debug, Deserialize)]
pub struct NewReview {
    pub product: ProductId,
    pub rating: Rating,
    pub comment: String,
}

impl NewReview {
    /// Trim the comment, rejecting blanks.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Blank` if the comment is empty.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.comment = required_text("comment", &self.comment)?;
        Ok(self)
    }
}

/// Request body for editing a review.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewUpdate {
    pub rating: Option<Rating>,
    pub comment: Option<String>,
}

impl ReviewUpdate {
    /// Trim the comment if present, rejecting blanks.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Blank` if the comment is empty.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.comment = optional_text("comment", self.comment.as_deref())?;
        Ok(self)
    }
}
