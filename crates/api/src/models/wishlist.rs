//! Wishlist types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{ProductId, UserId, WishlistItemId};

use super::product::{Product, ProductRow};
use crate::db::RepositoryError;

/// A product saved to a user's wishlist.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    #[serde(rename = "_id")]
    pub id: WishlistItemId,
    pub user: UserId,
    pub product: Product,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Wishlist row joined with its product.
#[derive(Debug, sqlx::FromRow)]
pub struct WishlistRow {
    pub wishlist_item_id: WishlistItemId,
    pub user_id: UserId,
    pub note: Option<String>,
    pub item_created_at: DateTime<Utc>,
    pub item_updated_at: DateTime<Utc>,
    #[sqlx(flatten)]
    pub product: ProductRow,
}

impl TryFrom<WishlistRow> for WishlistItem {
    type Error = RepositoryError;

    fn try_from(row: WishlistRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.wishlist_item_id,
            user: row.user_id,
            product: Product::try_from(row.product)?,
            note: row.note,
            created_at: row.item_created_at,
            updated_at: row.item_updated_at,
        })
    }
}

/// Request body for adding a product to the wishlist.
#[derive(Debug, Deserialize)]
pub struct NewWishlistItem {
    pub product: ProductId,
    pub note: Option<String>,
}

/// Request body for editing a wishlist note.
#[derive(Debug, Deserialize)]
pub struct WishlistUpdate {
    pub note: Option<String>,
}

/// Trim a note, treating blank text as no note.
#[must_use]
pub fn normalize_note(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty())
}
