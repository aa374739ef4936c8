//! Brand and category route handlers.
//!
//! Reads are served from the in-process catalog cache.

use axum::{extract::State, http::StatusCode};

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{Brand, Category, NewCatalogEntry, required_text};
use crate::routes::extract::Json;
use crate::state::AppState;

/// GET /brands
pub async fn brands(State(state): State<AppState>) -> Result<Json<Vec<Brand>>> {
    let brands = state.catalog().brands(state.pool()).await?;
    Ok(Json(brands.to_vec()))
}

/// POST /brands
pub async fn create_brand(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Json(body): Json<NewCatalogEntry>,
) -> Result<(StatusCode, Json<Brand>)> {
    let name = required_text("name", &body.name)?;
    let brand = state.catalog().create_brand(state.pool(), &name).await?;
    Ok((StatusCode::CREATED, Json(brand)))
}

/// GET /categories
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = state.catalog().categories(state.pool()).await?;
    Ok(Json(categories.to_vec()))
}

/// POST /categories
pub async fn create_category(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Json(body): Json<NewCatalogEntry>,
) -> Result<(StatusCode, Json<Category>)> {
    let name = required_text("name", &body.name)?;
    let category = state
        .catalog()
        .create_category(state.pool(), &name)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}
