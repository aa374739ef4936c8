//! Product review route handlers.

use axum::{extract::State, http::StatusCode, response::Response};
use bazaar_core::{ProductId, ReviewId};

use crate::db::reviews::ReviewRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{NewReview, Review, ReviewUpdate};
use crate::routes::extract::{Json, Path, Query};
use crate::routes::{PageParams, with_total_count};
use crate::state::AppState;

async fn find_review(state: &AppState, id: ReviewId) -> Result<Review> {
    ReviewRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".to_string()))
}

/// POST /reviews
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<NewReview>,
) -> Result<(StatusCode, Json<Review>)> {
    let body = body.validate()?;
    let review = ReviewRepository::new(state.pool())
        .create(user.id, body.product, body.rating, &body.comment)
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// A product's reviews, newest first.
///
/// GET /reviews/product/{id}?page=1&limit=10
pub async fn for_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Query(params): Query<PageParams>,
) -> Result<Response> {
    let (reviews, total) = ReviewRepository::new(state.pool())
        .list_for_product(id, params.page()?)
        .await?;

    Ok(with_total_count(total, reviews))
}

/// Edit a review. Only its author may.
///
/// PATCH /reviews/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<ReviewId>,
    Json(body): Json<ReviewUpdate>,
) -> Result<Json<Review>> {
    let body = body.validate()?;
    let review = find_review(&state, id).await?;
    auth.ensure_owner(review.user.id)?;

    let review = ReviewRepository::new(state.pool())
        .update(id, body.rating, body.comment.as_deref())
        .await?;
    Ok(Json(review))
}

/// Delete a review. Its author or an admin may.
///
/// DELETE /reviews/{id}
pub async fn remove(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<ReviewId>,
) -> Result<Json<Review>> {
    let review = find_review(&state, id).await?;
    auth.ensure_can_access(&state, review.user.id).await?;
    ReviewRepository::new(state.pool()).delete(id).await?;
    Ok(Json(review))
}
