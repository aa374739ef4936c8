//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_core::{BrandId, CategoryId, Discount, ProductId};

use super::{Brand, Category, ValidationError, optional_text, required_text};
use crate::db::RepositoryError;

/// A catalog product with its brand and category embedded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub title: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(serialize_with = "super::serialize_discount")]
    pub discount_percentage: Discount,
    pub category: Category,
    pub brand: Brand,
    pub stock_quantity: i32,
    pub thumbnail: String,
    pub images: Vec<String>,
    #[serde(rename = "isDeleted")]
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Unit price after the product's discount.
    #[must_use]
    pub fn discounted_price(&self) -> Decimal {
        self.discount_percentage.apply(self.price)
    }
}

/// Flat product row as selected by the product repository.
///
/// Column names match the `PRODUCT_COLUMNS` projection in
/// [`crate::db::products`].
#[derive(Debug, sqlx::FromRow)]
pub struct ProductRow {
    pub product_id: ProductId,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub discount_percentage: Decimal,
    pub stock_quantity: i32,
    pub thumbnail: String,
    pub images: Vec<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub brand_id: BrandId,
    pub brand_name: String,
    pub category_id: CategoryId,
    pub category_name: String,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let discount_percentage = Discount::new(row.discount_percentage).map_err(|e| {
            RepositoryError::DataCorruption(format!(
                "invalid discount on product {}: {e}",
                row.product_id
            ))
        })?;

        Ok(Self {
            id: row.product_id,
            title: row.title,
            description: row.description,
            price: row.price,
            discount_percentage,
            category: Category {
                id: row.category_id,
                name: row.category_name,
            },
            brand: Brand {
                id: row.brand_id,
                name: row.brand_name,
            },
            stock_quantity: row.stock_quantity,
            thumbnail: row.thumbnail,
            images: row.images,
            deleted: row.is_deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Request body for creating a product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub discount_percentage: Discount,
    pub category: CategoryId,
    pub brand: BrandId,
    #[serde(default)]
    pub stock_quantity: i32,
    pub thumbnail: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl NewProduct {
    /// Trim text fields and check numeric ranges.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first offending field.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.title = required_text("title", &self.title)?;
        self.description = required_text("description", &self.description)?;
        self.thumbnail = required_text("thumbnail", &self.thumbnail)?;
        check_price(self.price)?;
        check_stock(self.stock_quantity)?;
        Ok(self)
    }
}

/// Request body for a partial product update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub discount_percentage: Option<Discount>,
    pub category: Option<CategoryId>,
    pub brand: Option<BrandId>,
    pub stock_quantity: Option<i32>,
    pub thumbnail: Option<String>,
    pub images: Option<Vec<String>>,
}

impl ProductUpdate {
    /// Trim present text fields and check present numeric fields.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first offending field.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.title = optional_text("title", self.title.as_deref())?;
        self.description = optional_text("description", self.description.as_deref())?;
        self.thumbnail = optional_text("thumbnail", self.thumbnail.as_deref())?;
        if let Some(price) = self.price {
            check_price(price)?;
        }
        if let Some(stock) = self.stock_quantity {
            check_stock(stock)?;
        }
        Ok(self)
    }
}

fn check_price(price: Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() {
        return Err(ValidationError::OutOfRange {
            field: "price",
            reason: "must not be negative",
        });
    }
    Ok(())
}

fn check_stock(stock: i32) -> Result<(), ValidationError> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stockQuantity",
            reason: "must not be negative",
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample_row() -> ProductRow {
        ProductRow {
            product_id: ProductId::new(1),
            title: "Phone".to_string(),
            description: "A phone".to_string(),
            price: dec("499.99"),
            discount_percentage: dec("10"),
            stock_quantity: 4,
            thumbnail: "https://cdn.example.com/p.png".to_string(),
            images: vec!["https://cdn.example.com/p1.png".to_string()],
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            brand_id: BrandId::new(2),
            brand_name: "Acme".to_string(),
            category_id: CategoryId::new(3),
            category_name: "smartphones".to_string(),
        }
    }

    #[test]
    fn test_product_from_row_embeds_brand_and_category() {
        let product = Product::try_from(sample_row()).unwrap();
        let json = serde_json::to_value(&product).unwrap();

        assert_eq!(json["_id"], 1);
        assert_eq!(json["price"], 499.99);
        assert_eq!(json["discountPercentage"], 10.0);
        assert_eq!(json["brand"], serde_json::json!({"_id": 2, "name": "Acme"}));
        assert_eq!(
            json["category"],
            serde_json::json!({"_id": 3, "name": "smartphones"})
        );
        assert_eq!(json["stockQuantity"], 4);
        assert_eq!(json["isDeleted"], false);
    }

    #[test]
    fn test_product_from_row_rejects_bad_discount() {
        let mut row = sample_row();
        row.discount_percentage = dec("150");
        assert!(matches!(
            Product::try_from(row),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_discounted_price() {
        let product = Product::try_from(sample_row()).unwrap();
        assert_eq!(product.discounted_price(), dec("449.99"));
    }

    #[test]
    fn test_new_product_validation() {
        let body: NewProduct = serde_json::from_value(serde_json::json!({
            "title": "  Phone ",
            "description": "A phone",
            "price": 10.5,
            "category": 1,
            "brand": 1,
            "thumbnail": "t.png"
        }))
        .unwrap();

        let product = body.validate().unwrap();
        assert_eq!(product.title, "Phone");
        assert_eq!(product.discount_percentage, Discount::NONE);
        assert!(product.images.is_empty());
    }

    #[test]
    fn test_new_product_rejects_negative_price() {
        let body: NewProduct = serde_json::from_value(serde_json::json!({
            "title": "Phone",
            "description": "A phone",
            "price": -1,
            "category": 1,
            "brand": 1,
            "thumbnail": "t.png"
        }))
        .unwrap();

        assert_eq!(
            body.validate().unwrap_err(),
            ValidationError::OutOfRange {
                field: "price",
                reason: "must not be negative"
            }
        );
    }

    #[test]
    fn test_discount_out_of_range_fails_to_deserialize() {
        let result: Result<ProductUpdate, _> =
            serde_json::from_value(serde_json::json!({"discountPercentage": 120}));
        assert!(result.is_err());
    }

    #[test]
    fn test_update_rejects_blank_title() {
        let update = ProductUpdate {
            title: Some("   ".to_string()),
            ..ProductUpdate::default()
        };
        assert_eq!(update.validate().unwrap_err(), ValidationError::Blank("title"));
    }
}
