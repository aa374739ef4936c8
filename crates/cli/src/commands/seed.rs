//! Seed the catalog from a YAML file.
//!
//! # Usage
//!
//! ```bash
//! bazaar-cli seed crates/cli/seed/catalog.yaml
//! ```
//!
//! # File Format
//!
//! ```yaml
//! brands: [Acme, Globex]
//! categories: [lamps]
//! products:
//!   - title: Desk Lamp
//!     description: Adjustable LED lamp
//!     price: 49.99
//!     discountPercentage: 10
//!     brand: Acme
//!     category: lamps
//!     stockQuantity: 25
//!     thumbnail: https://cdn.example.com/lamp.jpg
//!     images: [https://cdn.example.com/lamp-1.jpg]
//! ```
//!
//! Brands and categories are upserted by name, so re-running a file does
//! not duplicate them. Products are always inserted.

use std::collections::HashMap;
use std::path::Path;

use bazaar_api::db::catalog::CatalogRepository;
use bazaar_api::db::products::ProductRepository;
use bazaar_api::models::NewProduct;
use bazaar_core::{BrandId, CategoryId, Discount};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use super::{CliError, connect};

/// Top-level seed document.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub brands: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

/// A product that refers to its brand and category by name.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedProduct {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub discount_percentage: Discount,
    pub brand: String,
    pub category: String,
    #[serde(default)]
    pub stock_quantity: i32,
    pub thumbnail: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl SeedFile {
    /// Brand names, including ones only mentioned by products, without
    /// duplicates.
    fn all_brands(&self) -> Vec<&str> {
        unique(
            self.brands
                .iter()
                .map(String::as_str)
                .chain(self.products.iter().map(|p| p.brand.as_str())),
        )
    }

    /// Category names, including ones only mentioned by products, without
    /// duplicates.
    fn all_categories(&self) -> Vec<&str> {
        unique(
            self.categories
                .iter()
                .map(String::as_str)
                .chain(self.products.iter().map(|p| p.category.as_str())),
        )
    }

    /// Reject blank names before anything touches the database.
    fn validate(&self) -> Result<(), CliError> {
        if let Some(blank) = self
            .all_brands()
            .into_iter()
            .chain(self.all_categories())
            .find(|name| name.trim().is_empty())
        {
            return Err(CliError::Seed(format!("blank brand or category name {blank:?}")));
        }
        Ok(())
    }
}

impl SeedProduct {
    fn into_new_product(self, brand: BrandId, category: CategoryId) -> Result<NewProduct, CliError> {
        let title = self.title.clone();
        NewProduct {
            title: self.title,
            description: self.description,
            price: self.price,
            discount_percentage: self.discount_percentage,
            category,
            brand,
            stock_quantity: self.stock_quantity,
            thumbnail: self.thumbnail,
            images: self.images,
        }
        .validate()
        .map_err(|e| CliError::Seed(format!("product {title:?}: {e}")))
    }
}

fn unique<'a>(names: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = Vec::new();
    for name in names.map(str::trim) {
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}

/// Parse a seed document.
///
/// # Errors
///
/// Returns an error if the YAML is malformed or contains blank names.
pub fn parse(content: &str) -> Result<SeedFile, CliError> {
    let file: SeedFile = serde_yaml::from_str(content)?;
    file.validate()?;
    Ok(file)
}

/// Seed brands, categories and products from `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a product is
/// invalid, or a database operation fails.
pub async fn catalog(path: &Path) -> Result<(), CliError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Io {
            path: path.display().to_string(),
            source,
        })?;
    let file = parse(&content)?;
    info!(
        brands = file.brands.len(),
        categories = file.categories.len(),
        products = file.products.len(),
        "Parsed seed file"
    );

    let pool = connect().await?;
    let catalog = CatalogRepository::new(&pool);

    let mut brands: HashMap<String, BrandId> = HashMap::new();
    for name in file.all_brands() {
        let brand = catalog.ensure_brand(name).await?;
        brands.insert(name.to_owned(), brand.id);
    }

    let mut categories: HashMap<String, CategoryId> = HashMap::new();
    for name in file.all_categories() {
        let category = catalog.ensure_category(name).await?;
        categories.insert(name.to_owned(), category.id);
    }

    let products = ProductRepository::new(&pool);
    let mut inserted = 0_usize;
    for product in file.products {
        let (Some(&brand), Some(&category)) = (
            brands.get(product.brand.trim()),
            categories.get(product.category.trim()),
        ) else {
            return Err(CliError::Seed(format!(
                "product {:?} refers to an unknown brand or category",
                product.title
            )));
        };

        let created = products
            .create(&product.into_new_product(brand, category)?)
            .await?;
        info!(product_id = %created.id, title = %created.title, "Product created");
        inserted += 1;
    }

    info!("Seeding complete!");
    info!("  Brands: {}", brands.len());
    info!("  Categories: {}", categories.len());
    info!("  Products inserted: {inserted}");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r"
brands: [Acme]
categories: [lamps]
products:
  - title: Desk Lamp
    description: Adjustable LED lamp
    price: 49.99
    discountPercentage: 10
    brand: Globex
    category: lamps
    stockQuantity: 25
    thumbnail: https://cdn.example.com/lamp.jpg
";

    #[test]
    fn test_parse_collects_names_from_products() {
        let file = parse(SAMPLE).unwrap();

        assert_eq!(file.all_brands(), vec!["Acme", "Globex"]);
        assert_eq!(file.all_categories(), vec!["lamps"]);
        assert_eq!(file.products.len(), 1);
        assert!(file.products[0].images.is_empty());
    }

    #[test]
    fn test_parse_rejects_blank_names() {
        let err = parse("brands: ['  ']").unwrap_err();
        assert!(matches!(err, CliError::Seed(_)));
    }

    #[test]
    fn test_invalid_product_is_reported_by_title() {
        let mut file = parse(SAMPLE).unwrap();
        let mut product = file.products.remove(0);
        product.description = "   ".to_string();

        let err = product
            .into_new_product(BrandId::new(1), CategoryId::new(1))
            .unwrap_err();
        assert!(err.to_string().contains("Desk Lamp"));
    }
}
