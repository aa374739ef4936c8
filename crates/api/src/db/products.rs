//! Product repository and list filtering.
//!
//! Product listings support repeated `brand` / `category` filters, hiding
//! soft-deleted rows, whitelisted sorting, and optional pagination. Filters
//! are assembled with [`sqlx::QueryBuilder`] so every client value is bound,
//! never spliced into SQL.

use sqlx::{PgPool, Postgres, QueryBuilder};
use thiserror::Error;

use bazaar_core::{BrandId, CategoryId, Page, PageError, ProductId};

use super::RepositoryError;
use crate::models::product::ProductRow;
use crate::models::{NewProduct, Product, ProductUpdate};

/// Columns selected for a [`ProductRow`], relative to [`PRODUCT_FROM`].
pub(crate) const PRODUCT_COLUMNS: &str = r"
    p.id AS product_id, p.title, p.description, p.price, p.discount_percentage,
    p.stock_quantity, p.thumbnail, p.images, p.is_deleted, p.created_at, p.updated_at,
    b.id AS brand_id, b.name AS brand_name,
    c.id AS category_id, c.name AS category_name";

/// Products joined with their brand and category.
pub(crate) const PRODUCT_FROM: &str = r"
    shop.products p
    JOIN shop.brands b ON b.id = p.brand_id
    JOIN shop.categories c ON c.id = p.category_id";

/// Errors in a product list query string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProductQueryError {
    #[error("invalid {key} id: {value:?}")]
    InvalidId { key: &'static str, value: String },

    #[error("cannot sort by {0:?}")]
    InvalidSort(String),

    #[error("order must be asc or desc (got {0:?})")]
    InvalidOrder(String),

    #[error("invalid {key}: {value:?}")]
    InvalidNumber { key: &'static str, value: String },

    #[error(transparent)]
    Page(#[from] PageError),
}

/// Columns a product list may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Price,
    Title,
    CreatedAt,
    StockQuantity,
    DiscountPercentage,
}

impl SortKey {
    fn parse(value: &str) -> Result<Self, ProductQueryError> {
        match value {
            "price" => Ok(Self::Price),
            "title" => Ok(Self::Title),
            "createdAt" => Ok(Self::CreatedAt),
            "stockQuantity" => Ok(Self::StockQuantity),
            "discountPercentage" => Ok(Self::DiscountPercentage),
            other => Err(ProductQueryError::InvalidSort(other.to_owned())),
        }
    }

    const fn column(self) -> &'static str {
        match self {
            Self::Price => "p.price",
            Self::Title => "p.title",
            Self::CreatedAt => "p.created_at",
            Self::StockQuantity => "p.stock_quantity",
            Self::DiscountPercentage => "p.discount_percentage",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    fn parse(value: &str) -> Result<Self, ProductQueryError> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(ProductQueryError::InvalidOrder(value.to_owned())),
        }
    }

    const fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A parsed product list request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub brands: Vec<BrandId>,
    pub categories: Vec<CategoryId>,
    /// Hide soft-deleted products (the storefront view).
    pub hide_deleted: bool,
    pub sort: Option<(SortKey, SortOrder)>,
    /// `None` returns every match.
    pub page: Option<Page>,
}

impl ProductFilter {
    /// Parse a raw query string such as
    /// `brand=1&brand=2&category=3&sort=price&order=desc&page=2&limit=10&user=true`.
    ///
    /// `brand` and `category` may repeat or hold comma-separated ids. `_sort`,
    /// `_order`, `_page` and `_limit` are accepted as aliases.
    ///
    /// # Errors
    ///
    /// Returns `ProductQueryError` for malformed ids, sort keys, orders or
    /// page parameters.
    pub fn from_query(query: &str) -> Result<Self, ProductQueryError> {
        let mut filter = Self::default();
        let mut sort_key = None;
        let mut sort_order = SortOrder::default();
        let mut page = None;
        let mut limit = None;

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "brand" => filter.brands.extend(parse_ids::<BrandId>("brand", &value)?),
                "category" => filter
                    .categories
                    .extend(parse_ids::<CategoryId>("category", &value)?),
                "user" => filter.hide_deleted = value == "true",
                "sort" | "_sort" => sort_key = Some(SortKey::parse(&value)?),
                "order" | "_order" => sort_order = SortOrder::parse(&value)?,
                "page" | "_page" => page = Some(parse_number("page", &value)?),
                "limit" | "_limit" => limit = Some(parse_number("limit", &value)?),
                _ => {}
            }
        }

        filter.sort = sort_key.map(|key| (key, sort_order));
        if page.is_some() || limit.is_some() {
            filter.page = Some(Page::new(page, limit)?);
        }
        Ok(filter)
    }

    fn push_conditions(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE TRUE");
        if !self.brands.is_empty() {
            let ids: Vec<i32> = self.brands.iter().map(BrandId::as_i32).collect();
            qb.push(" AND p.brand_id = ANY(").push_bind(ids).push(")");
        }
        if !self.categories.is_empty() {
            let ids: Vec<i32> = self.categories.iter().map(CategoryId::as_i32).collect();
            qb.push(" AND p.category_id = ANY(").push_bind(ids).push(")");
        }
        if self.hide_deleted {
            qb.push(" AND NOT p.is_deleted");
        }
    }

    /// The paginated `SELECT` for this filter.
    fn select_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM {PRODUCT_FROM}"));
        self.push_conditions(&mut qb);

        qb.push(" ORDER BY ");
        if let Some((key, order)) = self.sort {
            qb.push(key.column()).push(" ").push(order.keyword()).push(", ");
        }
        qb.push("p.id ASC");

        if let Some(page) = self.page {
            qb.push(" LIMIT ").push_bind(page.limit());
            qb.push(" OFFSET ").push_bind(page.offset());
        }
        qb
    }

    /// The unpaginated `COUNT(*)` for this filter.
    fn count_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {PRODUCT_FROM}"));
        self.push_conditions(&mut qb);
        qb
    }
}

fn parse_ids<T>(key: &'static str, value: &str) -> Result<Vec<T>, ProductQueryError>
where
    T: std::str::FromStr,
{
    value
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            part.parse::<T>().map_err(|_| ProductQueryError::InvalidId {
                key,
                value: part.to_owned(),
            })
        })
        .collect()
}

fn parse_number(key: &'static str, value: &str) -> Result<u32, ProductQueryError> {
    value
        .trim()
        .parse()
        .map_err(|_| ProductQueryError::InvalidNumber {
            key,
            value: value.to_owned(),
        })
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching `filter`, with the total match count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list(&self, filter: &ProductFilter) -> Result<(Vec<Product>, i64), RepositoryError> {
        let rows = filter
            .select_query()
            .build_query_as::<ProductRow>()
            .fetch_all(self.pool)
            .await?;

        let total = filter
            .count_query()
            .build_query_scalar::<i64>()
            .fetch_one(self.pool)
            .await?;

        let products = rows
            .into_iter()
            .map(Product::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((products, total))
    }

    /// Get a product by ID, including soft-deleted ones.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM {PRODUCT_FROM} WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Get several products by ID. Missing IDs are simply absent from the
    /// result.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM {PRODUCT_FROM} WHERE p.id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the brand or category
    /// doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let id: ProductId = sqlx::query_scalar(
            r"
            INSERT INTO shop.products
                (title, description, price, discount_percentage, category_id, brand_id,
                 stock_quantity, thumbnail, images)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            ",
        )
        .bind(&product.title)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.discount_percentage.percent())
        .bind(product.category)
        .bind(product.brand)
        .bind(product.stock_quantity)
        .bind(&product.thumbnail)
        .bind(&product.images)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "product already exists"))?;

        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Apply a partial update. Absent fields keep their current values.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::InvalidReference` if a new brand or category
    /// doesn't exist.
    pub async fn update(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        let updated: Option<ProductId> = sqlx::query_scalar(
            r"
            UPDATE shop.products SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                discount_percentage = COALESCE($5, discount_percentage),
                category_id = COALESCE($6, category_id),
                brand_id = COALESCE($7, brand_id),
                stock_quantity = COALESCE($8, stock_quantity),
                thumbnail = COALESCE($9, thumbnail),
                images = COALESCE($10, images),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id
            ",
        )
        .bind(id)
        .bind(update.title.as_deref())
        .bind(update.description.as_deref())
        .bind(update.price)
        .bind(update.discount_percentage.map(|d| d.percent()))
        .bind(update.category)
        .bind(update.brand)
        .bind(update.stock_quantity)
        .bind(update.thumbnail.as_deref())
        .bind(update.images.as_deref())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "product already exists"))?;

        let id = updated.ok_or(RepositoryError::NotFound)?;
        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Soft-delete or restore a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn set_deleted(&self, id: ProductId, deleted: bool) -> Result<Product, RepositoryError> {
        let updated: Option<ProductId> = sqlx::query_scalar(
            r"
            UPDATE shop.products
            SET is_deleted = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id
            ",
        )
        .bind(id)
        .bind(deleted)
        .fetch_optional(self.pool)
        .await?;

        let id = updated.ok_or(RepositoryError::NotFound)?;
        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }
}
