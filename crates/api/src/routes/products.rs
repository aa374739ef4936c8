//! Product route handlers.
//!
//! Listing is public; every write requires an admin. Deletion is soft, so a
//! deleted product can be restored with `undelete`.

use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::Response,
};
use bazaar_core::ProductId;
use tracing::instrument;

use crate::db::products::{ProductFilter, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{NewProduct, Product, ProductUpdate};
use crate::routes::extract::{Json, Path};
use crate::routes::with_total_count;
use crate::state::AppState;

/// List products.
///
/// GET /products?brand=1&category=2&sort=price&order=desc&page=1&limit=10&user=true
///
/// The raw query string is parsed by hand because `brand` and `category`
/// repeat.
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>, RawQuery(query): RawQuery) -> Result<Response> {
    let filter = ProductFilter::from_query(query.as_deref().unwrap_or_default())?;
    let (products, total) = ProductRepository::new(state.pool()).list(&filter).await?;

    Ok(with_total_count(total, products))
}

/// Fetch one product with its brand and category.
///
/// GET /products/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(product))
}

/// Create a product.
///
/// POST /products
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(body): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = ProductRepository::new(state.pool())
        .create(&body.validate()?)
        .await?;

    tracing::info!(product_id = %product.id, admin_id = %admin.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// Partially update a product.
///
/// PATCH /products/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(body): Json<ProductUpdate>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .update(id, &body.validate()?)
        .await?;

    Ok(Json(product))
}

/// Soft-delete a product.
///
/// DELETE /products/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .set_deleted(id, true)
        .await?;

    tracing::info!(product_id = %id, admin_id = %admin.id, "Product deleted");
    Ok(Json(product))
}

/// Restore a soft-deleted product.
///
/// PATCH /products/undelete/{id}
pub async fn undelete(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .set_deleted(id, false)
        .await?;

    Ok(Json(product))
}
