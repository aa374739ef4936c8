//! Cached brand and category lists.
//!
//! Both lists are small, read on nearly every storefront page, and change
//! only through admin writes, so they are cached with `moka` and
//! invalidated whenever a brand or category is created.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::db::RepositoryError;
use crate::db::catalog::CatalogRepository;
use crate::models::{Brand, Category};

/// Cache TTL; invalidation on write keeps entries fresh within a process.
const CATALOG_TTL: Duration = Duration::from_secs(300);

/// Brand and category lists shared across requests.
#[derive(Clone)]
pub struct CatalogCache {
    brands: Cache<(), Arc<Vec<Brand>>>,
    categories: Cache<(), Arc<Vec<Category>>>,
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            brands: Cache::builder().max_capacity(1).time_to_live(CATALOG_TTL).build(),
            categories: Cache::builder().max_capacity(1).time_to_live(CATALOG_TTL).build(),
        }
    }

    /// All brands, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the list has to be loaded and the query fails.
    pub async fn brands(&self, pool: &PgPool) -> Result<Arc<Vec<Brand>>, RepositoryError> {
        if let Some(brands) = self.brands.get(&()).await {
            return Ok(brands);
        }

        let brands = Arc::new(CatalogRepository::new(pool).list_brands().await?);
        self.brands.insert((), Arc::clone(&brands)).await;
        Ok(brands)
    }

    /// All categories, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the list has to be loaded and the query fails.
    pub async fn categories(&self, pool: &PgPool) -> Result<Arc<Vec<Category>>, RepositoryError> {
        if let Some(categories) = self.categories.get(&()).await {
            return Ok(categories);
        }

        let categories = Arc::new(CatalogRepository::new(pool).list_categories().await?);
        self.categories.insert((), Arc::clone(&categories)).await;
        Ok(categories)
    }

    /// Create a brand and drop the cached list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn create_brand(&self, pool: &PgPool, name: &str) -> Result<Brand, RepositoryError> {
        let brand = CatalogRepository::new(pool).create_brand(name).await?;
        self.brands.invalidate(&()).await;
        Ok(brand)
    }

    /// Create a category and drop the cached list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn create_category(
        &self,
        pool: &PgPool,
        name: &str,
    ) -> Result<Category, RepositoryError> {
        let category = CatalogRepository::new(pool).create_category(name).await?;
        self.categories.invalidate(&()).await;
        Ok(category)
    }
}
