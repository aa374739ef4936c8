//! Order types.
//!
//! An order stores a snapshot of every product line and of the shipping
//! address at the moment it was placed, so later catalog or address edits
//! never rewrite order history.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

use bazaar_core::{Discount, OrderId, OrderStatus, PaymentMode, ProductId, UserId, line_total};

use super::cart::MAX_QUANTITY;
use super::{AddressFields, Product, ValidationError};

/// A product line frozen into an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product: ProductId,
    pub title: String,
    pub brand: String,
    pub thumbnail: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(serialize_with = "super::serialize_discount")]
    pub discount_percentage: Discount,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub line_total: Decimal,
}

impl OrderLine {
    /// Snapshot `quantity` units of `product`.
    #[must_use]
    pub fn snapshot(product: &Product, quantity: u32) -> Self {
        Self {
            product: product.id,
            title: product.title.clone(),
            brand: product.brand.name.clone(),
            thumbnail: product.thumbnail.clone(),
            price: product.price,
            discount_percentage: product.discount_percentage,
            quantity,
            line_total: line_total(product.price, product.discount_percentage, quantity),
        }
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    pub user: UserId,
    pub items: Vec<OrderLine>,
    pub address: AddressFields,
    pub status: OrderStatus,
    pub payment_mode: PaymentMode,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Order row with its JSONB snapshot columns.
#[derive(Debug, sqlx::FromRow)]
pub struct OrderRow {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Json<Vec<OrderLine>>,
    pub address: Json<AddressFields>,
    pub status: OrderStatus,
    pub payment_mode: PaymentMode,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            user: row.user_id,
            items: row.items.0,
            address: row.address.0,
            status: row.status,
            payment_mode: row.payment_mode,
            total: row.total,
            created_at: row.created_at,
        }
    }
}

/// One requested line of a new order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLineRequest {
    pub product: ProductId,
    pub quantity: u32,
}

/// Request body for placing an order.
///
/// Prices are never accepted from the client; they are read from the
/// catalog when the order is placed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub items: Vec<OrderLineRequest>,
    pub address: AddressFields,
    pub payment_mode: PaymentMode,
}

impl NewOrder {
    /// Validate the address and merge repeated products into one line each.
    ///
    /// Line order follows the first appearance of each product.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if there are no items, a merged
    /// quantity is zero or above [`MAX_QUANTITY`], or an address field is
    /// blank.
    pub fn validate(self) -> Result<Self, ValidationError> {
        if self.items.is_empty() {
            return Err(ValidationError::Empty("items"));
        }

        let mut merged: Vec<OrderLineRequest> = Vec::with_capacity(self.items.len());
        for line in self.items {
            if line.quantity == 0 {
                return Err(ValidationError::OutOfRange {
                    field: "quantity",
                    reason: "must be at least 1",
                });
            }
            match merged.iter_mut().find(|m| m.product == line.product) {
                Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
                None => merged.push(line),
            }
        }
        if merged
            .iter()
            .any(|line| i64::from(line.quantity) > i64::from(MAX_QUANTITY))
        {
            return Err(ValidationError::OutOfRange {
                field: "quantity",
                reason: "must be at most 10000",
            });
        }

        Ok(Self {
            items: merged,
            address: self.address.validate()?,
            payment_mode: self.payment_mode,
        })
    }
}

/// Request body for changing an order's status.
#[derive(Debug, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::models::{Brand, Category};
    use bazaar_core::{BrandId, CategoryId};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn address_json() -> serde_json::Value {
        serde_json::json!({
            "street": "1 Main St",
            "city": "Pune",
            "state": "MH",
            "phoneNumber": "5550100",
            "postalCode": "411001",
            "country": "India",
            "type": "Home"
        })
    }

    fn product(price: &str, discount: &str) -> Product {
        Product {
            id: ProductId::new(7),
            title: "Lamp".to_string(),
            description: "A lamp".to_string(),
            price: dec(price),
            discount_percentage: Discount::new(dec(discount)).unwrap(),
            category: Category {
                id: CategoryId::new(1),
                name: "lighting".to_string(),
            },
            brand: Brand {
                id: BrandId::new(1),
                name: "Glow".to_string(),
            },
            stock_quantity: 3,
            thumbnail: "lamp.png".to_string(),
            images: Vec::new(),
            deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_snapshot_computes_line_total() {
        let line = OrderLine::snapshot(&product("19.99", "25"), 3);

        assert_eq!(line.brand, "Glow");
        assert_eq!(line.quantity, 3);
        assert_eq!(line.line_total, dec("44.97"));
    }

    #[test]
    fn test_order_line_survives_jsonb_storage() {
        let line = OrderLine::snapshot(&product("10.10", "12.5"), 2);
        let stored = serde_json::to_value(&line).unwrap();
        let restored: OrderLine = serde_json::from_value(stored.clone()).unwrap();

        assert_eq!(stored["discountPercentage"], 12.5);
        assert_eq!(restored, line);
    }

    #[test]
    fn test_new_order_merges_duplicate_products() {
        let body: NewOrder = serde_json::from_value(serde_json::json!({
            "items": [
                {"product": 1, "quantity": 2},
                {"product": 2, "quantity": 1},
                {"product": 1, "quantity": 3}
            ],
            "address": address_json(),
            "paymentMode": "COD"
        }))
        .unwrap();

        let order = body.validate().unwrap();
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].product, ProductId::new(1));
        assert_eq!(order.items[0].quantity, 5);
        assert_eq!(order.payment_mode, PaymentMode::Cod);
    }

    #[test]
    fn test_new_order_requires_items() {
        let body: NewOrder = serde_json::from_value(serde_json::json!({
            "items": [],
            "address": address_json(),
            "paymentMode": "UPI"
        }))
        .unwrap();

        assert_eq!(body.validate().unwrap_err(), ValidationError::Empty("items"));
    }

    #[test]
    fn test_new_order_rejects_zero_quantity() {
        let body: NewOrder = serde_json::from_value(serde_json::json!({
            "items": [{"product": 1, "quantity": 0}],
            "address": address_json(),
            "paymentMode": "CARD"
        }))
        .unwrap();

        assert!(body.validate().is_err());
    }

    #[test]
    fn test_new_order_rejects_oversized_merged_quantity() {
        let body: NewOrder = serde_json::from_value(serde_json::json!({
            "items": [
                {"product": 1, "quantity": 6000},
                {"product": 1, "quantity": 6000}
            ],
            "address": address_json(),
            "paymentMode": "COD"
        }))
        .unwrap();

        assert!(matches!(
            body.validate().unwrap_err(),
            ValidationError::OutOfRange { field: "quantity", .. }
        ));
    }
}
