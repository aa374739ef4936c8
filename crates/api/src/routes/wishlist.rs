//! Wishlist route handlers.

use axum::{extract::State, http::StatusCode, response::Response};
use bazaar_core::{UserId, WishlistItemId};

use crate::db::wishlist::WishlistRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::wishlist::{WishlistUpdate, normalize_note};
use crate::models::{NewWishlistItem, WishlistItem};
use crate::routes::extract::{Json, Path, Query};
use crate::routes::{PageParams, with_total_count};
use crate::state::AppState;

async fn owned_item(
    state: &AppState,
    auth: &RequireAuth,
    id: WishlistItemId,
) -> Result<WishlistItem> {
    let item = WishlistRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Wishlist item not found".to_string()))?;
    auth.ensure_owner(item.user)?;
    Ok(item)
}

/// POST /wishlist
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<NewWishlistItem>,
) -> Result<(StatusCode, Json<WishlistItem>)> {
    let note = normalize_note(body.note);
    let item = WishlistRepository::new(state.pool())
        .create(user.id, body.product, note.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /wishlist/user/{id}?page=1&limit=10
pub async fn for_user(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<UserId>,
    Query(params): Query<PageParams>,
) -> Result<Response> {
    auth.ensure_can_access(&state, id).await?;

    let (items, total) = WishlistRepository::new(state.pool())
        .list_for_user(id, params.page()?)
        .await?;
    Ok(with_total_count(total, items))
}

/// PATCH /wishlist/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<WishlistItemId>,
    Json(body): Json<WishlistUpdate>,
) -> Result<Json<WishlistItem>> {
    owned_item(&state, &auth, id).await?;

    let note = normalize_note(body.note);
    let item = WishlistRepository::new(state.pool())
        .set_note(id, note.as_deref())
        .await?;
    Ok(Json(item))
}

/// DELETE /wishlist/{id}
pub async fn remove(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<WishlistItemId>,
) -> Result<Json<WishlistItem>> {
    let item = owned_item(&state, &auth, id).await?;
    WishlistRepository::new(state.pool()).delete(id).await?;
    Ok(Json(item))
}
