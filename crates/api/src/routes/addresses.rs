//! Address book route handlers.

use axum::{extract::State, http::StatusCode};
use bazaar_core::{AddressId, UserId};

use crate::db::addresses::AddressRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Address, AddressFields, AddressUpdate};
use crate::routes::extract::{Json, Path};
use crate::state::AppState;

async fn owned_address(state: &AppState, auth: &RequireAuth, id: AddressId) -> Result<Address> {
    let address = AddressRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Address not found".to_string()))?;
    auth.ensure_owner(address.user)?;
    Ok(address)
}

/// POST /address
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<AddressFields>,
) -> Result<(StatusCode, Json<Address>)> {
    let address = AddressRepository::new(state.pool())
        .create(user.id, &body.validate()?)
        .await?;
    Ok((StatusCode::CREATED, Json(address)))
}

/// GET /address/user/{id}
pub async fn for_user(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<UserId>,
) -> Result<Json<Vec<Address>>> {
    auth.ensure_can_access(&state, id).await?;

    let addresses = AddressRepository::new(state.pool()).list_for_user(id).await?;
    Ok(Json(addresses))
}

/// PATCH /address/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<AddressId>,
    Json(body): Json<AddressUpdate>,
) -> Result<Json<Address>> {
    let update = body.validate()?;
    owned_address(&state, &auth, id).await?;

    let address = AddressRepository::new(state.pool()).update(id, &update).await?;
    Ok(Json(address))
}

/// DELETE /address/{id}
pub async fn remove(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<AddressId>,
) -> Result<Json<Address>> {
    owned_address(&state, &auth, id).await?;

    let address = AddressRepository::new(state.pool()).delete(id).await?;
    Ok(Json(address))
}
