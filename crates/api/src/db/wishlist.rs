//! Wishlist repository.

use sqlx::PgPool;

use bazaar_core::{Page, ProductId, UserId, WishlistItemId};

use super::RepositoryError;
use super::products::{PRODUCT_COLUMNS, PRODUCT_FROM};
use crate::models::WishlistItem;
use crate::models::wishlist::WishlistRow;

fn select_items(condition: &str, tail: &str) -> String {
    format!(
        r"
        SELECT w.id AS wishlist_item_id, w.user_id, w.note,
               w.created_at AS item_created_at, w.updated_at AS item_updated_at,
               {PRODUCT_COLUMNS}
        FROM {PRODUCT_FROM}
        JOIN shop.wishlist_items w ON w.product_id = p.id
        WHERE {condition}
        {tail}
        "
    )
}

/// Repository for wishlist database operations.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of a user's wishlist, newest first, with the total count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        page: Page,
    ) -> Result<(Vec<WishlistItem>, i64), RepositoryError> {
        let rows = sqlx::query_as::<_, WishlistRow>(&select_items(
            "w.user_id = $1",
            "ORDER BY w.created_at DESC, w.id DESC LIMIT $2 OFFSET $3",
        ))
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.wishlist_items WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(WishlistItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total))
    }

    /// Get one wishlist item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: WishlistItemId) -> Result<Option<WishlistItem>, RepositoryError> {
        let row = sqlx::query_as::<_, WishlistRow>(&select_items("w.id = $1", ""))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(WishlistItem::try_from).transpose()
    }

    /// Save a product to a user's wishlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product is already saved.
    /// Returns `RepositoryError::InvalidReference` if the product doesn't exist.
    pub async fn create(
        &self,
        user_id: UserId,
        product_id: ProductId,
        note: Option<&str>,
    ) -> Result<WishlistItem, RepositoryError> {
        let id: WishlistItemId = sqlx::query_scalar(
            r"
            INSERT INTO shop.wishlist_items (user_id, product_id, note)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(note)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "product is already in the wishlist"))?;

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Replace an item's note.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't exist.
    pub async fn set_note(
        &self,
        id: WishlistItemId,
        note: Option<&str>,
    ) -> Result<WishlistItem, RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.wishlist_items SET note = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(note)
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Remove an item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't exist.
    pub async fn delete(&self, id: WishlistItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.wishlist_items WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
