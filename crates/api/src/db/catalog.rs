//! Brand and category repository.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::{Brand, Category};

/// Repository for the catalog taxonomy tables.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all brands ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_brands(&self) -> Result<Vec<Brand>, RepositoryError> {
        let brands = sqlx::query_as::<_, Brand>("SELECT id, name FROM shop.brands ORDER BY name")
            .fetch_all(self.pool)
            .await?;
        Ok(brands)
    }

    /// List all categories ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name FROM shop.categories ORDER BY name")
                .fetch_all(self.pool)
                .await?;
        Ok(categories)
    }

    /// Create a brand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn create_brand(&self, name: &str) -> Result<Brand, RepositoryError> {
        sqlx::query_as::<_, Brand>("INSERT INTO shop.brands (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "brand already exists"))
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn create_category(&self, name: &str) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO shop.categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "category already exists"))
    }

    /// Get a brand by name, creating it if missing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ensure_brand(&self, name: &str) -> Result<Brand, RepositoryError> {
        let brand = sqlx::query_as::<_, Brand>(
            r"
            INSERT INTO shop.brands (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name
            ",
        )
        .bind(name)
        .fetch_one(self.pool)
        .await?;
        Ok(brand)
    }

    /// Get a category by name, creating it if missing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ensure_category(&self, name: &str) -> Result<Category, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            r"
            INSERT INTO shop.categories (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name
            ",
        )
        .bind(name)
        .fetch_one(self.pool)
        .await?;
        Ok(category)
    }
}
