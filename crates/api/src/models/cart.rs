//! Cart line types.

use serde::{Deserialize, Serialize};

use bazaar_core::{CartItemId, ProductId, UserId};

use super::product::{Product, ProductRow};
use super::ValidationError;
use crate::db::RepositoryError;

/// One product in a user's cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    #[serde(rename = "_id")]
    pub id: CartItemId,
    pub user: UserId,
    pub product: Product,
    pub quantity: i32,
}

/// Cart row joined with its product.
#[derive(Debug, sqlx::FromRow)]
pub struct CartLineRow {
    pub cart_item_id: CartItemId,
    pub user_id: UserId,
    pub quantity: i32,
    #[sqlx(flatten)]
    pub product: ProductRow,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.cart_item_id,
            user: row.user_id,
            product: Product::try_from(row.product)?,
            quantity: row.quantity,
        })
    }
}

/// Request body for adding a product to the cart.
#[derive(Debug, Deserialize)]
pub struct NewCartLine {
    pub product: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

const fn default_quantity() -> i32 {
    1
}

/// Request body for changing a cart line's quantity.
#[derive(Debug, Deserialize)]
pub struct CartLineUpdate {
    pub quantity: i32,
}

/// Largest quantity of one product in a cart line or order line.
pub const MAX_QUANTITY: i32 = 10_000;

/// Reject quantities outside `1..=MAX_QUANTITY`.
///
/// # Errors
///
/// Returns `ValidationError::OutOfRange` otherwise.
pub fn check_quantity(quantity: i32) -> Result<i32, ValidationError> {
    if quantity < 1 {
        return Err(ValidationError::OutOfRange {
            field: "quantity",
            reason: "must be at least 1",
        });
    }
    if quantity > MAX_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity",
            reason: "must be at most 10000",
        });
    }
    Ok(quantity)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_defaults_to_one() {
        let body: NewCartLine = serde_json::from_str(r#"{"product": 4}"#).unwrap();
        assert_eq!(body.product, ProductId::new(4));
        assert_eq!(body.quantity, 1);
    }

    #[test]
    fn test_check_quantity() {
        assert_eq!(check_quantity(3), Ok(3));
        assert!(check_quantity(0).is_err());
        assert!(check_quantity(-2).is_err());
        assert_eq!(check_quantity(MAX_QUANTITY), Ok(MAX_QUANTITY));
        assert!(check_quantity(MAX_QUANTITY + 1).is_err());
        assert!(check_quantity(i32::MAX).is_err());
    }
}
