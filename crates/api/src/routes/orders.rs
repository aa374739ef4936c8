//! Order route handlers.

use axum::{extract::State, http::StatusCode, response::Response};
use bazaar_core::{OrderId, UserId};
use tracing::instrument;

use crate::db::orders::OrderRepository;
use crate::error::Result;
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::order::OrderStatusUpdate;
use crate::models::{NewOrder, Order};
use crate::routes::extract::{Json, Path, Query};
use crate::routes::{PageParams, with_total_count};
use crate::services::orders::OrderService;
use crate::state::AppState;

/// Place an order for the logged-in user.
///
/// POST /orders
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<NewOrder>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = OrderService::new(state.pool()).place(user.id, body).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// A user's orders, newest first.
///
/// GET /orders/user/{id}
pub async fn for_user(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<UserId>,
) -> Result<Json<Vec<Order>>> {
    auth.ensure_can_access(&state, id).await?;

    let orders = OrderRepository::new(state.pool()).list_for_user(id).await?;
    Ok(Json(orders))
}

/// Every order, newest first.
///
/// GET /orders?page=1&limit=10
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Query(params): Query<PageParams>,
) -> Result<Response> {
    let (orders, total) = OrderRepository::new(state.pool())
        .list(params.page()?)
        .await?;

    Ok(with_total_count(total, orders))
}

/// Move an order to a new status.
///
/// PATCH /orders/{id}
#[instrument(skip_all)]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(body): Json<OrderStatusUpdate>,
) -> Result<Json<Order>> {
    let order = OrderService::new(state.pool())
        .update_status(id, body.status)
        .await?;

    tracing::info!(order_id = %id, admin_id = %admin.id, status = ?order.status, "Order status changed");
    Ok(Json(order))
}
