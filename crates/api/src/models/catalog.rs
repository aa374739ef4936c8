//! Brand and category types.

use serde::{Deserialize, Serialize};

use bazaar_core::{BrandId, CategoryId};

/// A product brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Brand {
    #[serde(rename = "_id")]
    pub id: BrandId,
    pub name: String,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: CategoryId,
    pub name: String,
}

/// Request body for creating a brand or category.
#[derive(Debug, Deserialize)]
pub struct NewCatalogEntry {
    pub name: String,
}
