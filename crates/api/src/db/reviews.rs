//! Review repository.

use sqlx::PgPool;

use bazaar_core::{Page, ProductId, Rating, ReviewId, UserId};

use super::RepositoryError;
use crate::models::Review;
use crate::models::review::ReviewRow;

const REVIEW_SELECT: &str = r"
    SELECT r.id, r.user_id, u.name AS user_name, r.product_id, r.rating, r.comment, r.created_at
    FROM shop.reviews r
    JOIN shop.users u ON u.id = r.user_id";

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of a product's reviews, newest first, with the total count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
        page: Page,
    ) -> Result<(Vec<Review>, i64), RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            r"
            {REVIEW_SELECT}
            WHERE r.product_id = $1
            ORDER BY r.created_at DESC, r.id DESC
            LIMIT $2 OFFSET $3
            "
        ))
        .bind(product_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.reviews WHERE product_id = $1")
            .bind(product_id)
            .fetch_one(self.pool)
            .await?;

        Ok((rows.into_iter().map(Review::from).collect(), total))
    }

    /// Get one review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!("{REVIEW_SELECT} WHERE r.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Review::from))
    }

    /// Post a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        user_id: UserId,
        product_id: ProductId,
        rating: Rating,
        comment: &str,
    ) -> Result<Review, RepositoryError> {
        let id: ReviewId = sqlx::query_scalar(
            r"
            INSERT INTO shop.reviews (user_id, product_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "review already exists"))?;

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Edit a review's rating and/or comment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist.
    pub async fn update(
        &self,
        id: ReviewId,
        rating: Option<Rating>,
        comment: Option<&str>,
    ) -> Result<Review, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.reviews SET
                rating = COALESCE($2, rating),
                comment = COALESCE($3, comment)
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(rating)
        .bind(comment)
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist.
    pub async fn delete(&self, id: ReviewId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.reviews WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
