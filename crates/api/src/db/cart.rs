//! Cart repository.

use sqlx::PgPool;

use bazaar_core::{CartItemId, ProductId, UserId};

use super::RepositoryError;
use super::products::{PRODUCT_COLUMNS, PRODUCT_FROM};
use crate::models::CartLine;
use crate::models::cart::{CartLineRow, MAX_QUANTITY};

fn select_lines(condition: &str) -> String {
    format!(
        r"
        SELECT ci.id AS cart_item_id, ci.user_id, ci.quantity, {PRODUCT_COLUMNS}
        FROM {PRODUCT_FROM}
        JOIN shop.cart_items ci ON ci.product_id = p.id
        WHERE {condition}
        ORDER BY ci.id
        "
    )
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's cart lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(&select_lines("ci.user_id = $1"))
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(CartLine::try_from).collect()
    }

    /// Get one cart line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CartItemId) -> Result<Option<CartLine>, RepositoryError> {
        let row = sqlx::query_as::<_, CartLineRow>(&select_lines("ci.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(CartLine::try_from).transpose()
    }

    /// Add `quantity` of a product to a user's cart, incrementing the line if
    /// the product is already there. The line never exceeds [`MAX_QUANTITY`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartLine, RepositoryError> {
        let id: CartItemId = sqlx::query_scalar(
            r"
            INSERT INTO shop.cart_items (user_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = LEAST(shop.cart_items.quantity + EXCLUDED.quantity, $4)
            RETURNING id
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .bind(MAX_QUANTITY)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "cart line already exists"))?;

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Set a cart line's quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line doesn't exist.
    pub async fn set_quantity(
        &self,
        id: CartItemId,
        quantity: i32,
    ) -> Result<CartLine, RepositoryError> {
        let result = sqlx::query("UPDATE shop.cart_items SET quantity = $2 WHERE id = $1")
            .bind(id)
            .bind(quantity)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete a cart line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line doesn't exist.
    pub async fn delete(&self, id: CartItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.cart_items WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Empty a user's cart, returning the number of lines removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
