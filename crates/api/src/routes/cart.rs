//! Cart route handlers.
//!
//! Each line embeds its product (with brand and category) so the client can
//! render the cart without further lookups.

use axum::{extract::State, http::StatusCode};
use bazaar_core::{CartItemId, UserId};

use crate::db::cart::CartRepository;
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::cart::{CartLineUpdate, check_quantity};
use crate::models::{CartLine, NewCartLine};
use crate::routes::extract::{Json, Path};
use crate::state::AppState;

async fn owned_line(state: &AppState, auth: &RequireAuth, id: CartItemId) -> Result<CartLine> {
    let line = CartRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart item not found".to_string()))?;
    auth.ensure_owner(line.user)?;
    Ok(line)
}

/// Add a product to the logged-in user's cart.
///
/// Adding a product that is already in the cart raises its quantity.
///
/// POST /cart
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<NewCartLine>,
) -> Result<(StatusCode, Json<CartLine>)> {
    let quantity = check_quantity(body.quantity)?;

    let available = ProductRepository::new(state.pool())
        .get_by_id(body.product)
        .await?
        .is_some_and(|p| !p.deleted);
    if !available {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    let line = CartRepository::new(state.pool())
        .add(user.id, body.product, quantity)
        .await?;

    Ok((StatusCode::CREATED, Json(line)))
}

/// A user's cart.
///
/// GET /cart/user/{id}
pub async fn for_user(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<UserId>,
) -> Result<Json<Vec<CartLine>>> {
    auth.ensure_can_access(&state, id).await?;

    let lines = CartRepository::new(state.pool()).list_for_user(id).await?;
    Ok(Json(lines))
}

/// Change a line's quantity.
///
/// PATCH /cart/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<CartItemId>,
    Json(body): Json<CartLineUpdate>,
) -> Result<Json<CartLine>> {
    let quantity = check_quantity(body.quantity)?;
    owned_line(&state, &auth, id).await?;

    let line = CartRepository::new(state.pool())
        .set_quantity(id, quantity)
        .await?;
    Ok(Json(line))
}

/// Remove a line, returning it.
///
/// DELETE /cart/{id}
pub async fn remove(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<CartItemId>,
) -> Result<Json<CartLine>> {
    let line = owned_line(&state, &auth, id).await?;
    CartRepository::new(state.pool()).delete(id).await?;
    Ok(Json(line))
}

/// Empty a user's cart.
///
/// DELETE /cart/user/{id}
pub async fn clear(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<UserId>,
) -> Result<StatusCode> {
    auth.ensure_can_access(&state, id).await?;

    let removed = CartRepository::new(state.pool()).clear_for_user(id).await?;
    tracing::debug!(user_id = %id, removed, "Cart cleared");
    Ok(StatusCode::NO_CONTENT)
}
