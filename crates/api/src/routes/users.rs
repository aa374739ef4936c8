//! User profile route handlers.

use axum::extract::State;
use bazaar_core::UserId;

use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::user::UserUpdate;
use crate::models::{SanitizedUser, optional_text};
use crate::routes::extract::{Json, Path};
use crate::state::AppState;

/// Fetch a user's profile.
///
/// GET /users/{id}
pub async fn show(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<UserId>,
) -> Result<Json<SanitizedUser>> {
    auth.ensure_can_access(&state, id).await?;

    let user = UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(SanitizedUser::from(user)))
}

/// Update a user's profile.
///
/// PATCH /users/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<UserId>,
    Json(body): Json<UserUpdate>,
) -> Result<Json<SanitizedUser>> {
    auth.ensure_can_access(&state, id).await?;

    let users = UserRepository::new(state.pool());
    let user = match optional_text("name", body.name.as_deref())? {
        Some(name) => users.update_name(id, &name).await?,
        None => users
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?,
    };

    Ok(Json(SanitizedUser::from(user)))
}
