//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                         - Liveness message
//! GET    /health                   - Health check
//! GET    /health/ready             - Readiness (database) check
//!
//! # Auth (rate limited)
//! POST   /auth/signup              - Create an account and log in
//! POST   /auth/login               - Log in
//! POST   /auth/forgot-password     - Email a password reset link
//! POST   /auth/reset-password      - Redeem a reset link
//! GET    /auth/logout              - Log out
//! GET    /auth/check-auth          - Current user
//!
//! # Users
//! GET    /users/{id}               - Profile (self or admin)
//! PATCH  /users/{id}               - Update profile (self or admin)
//!
//! # Products
//! GET    /products                 - Filtered listing (X-Total-Count)
//! POST   /products                 - Create (admin)
//! GET    /products/{id}            - Detail
//! PATCH  /products/{id}            - Update (admin)
//! DELETE /products/{id}            - Soft delete (admin)
//! PATCH  /products/undelete/{id}   - Restore (admin)
//!
//! # Orders
//! POST   /orders                   - Place an order
//! GET    /orders                   - All orders (admin, X-Total-Count)
//! GET    /orders/user/{id}         - A user's orders
//! PATCH  /orders/{id}              - Change status (admin)
//!
//! # Cart
//! POST   /cart                     - Add a product
//! GET    /cart/user/{id}           - A user's cart
//! DELETE /cart/user/{id}           - Empty a user's cart
//! PATCH  /cart/{id}                - Change quantity
//! DELETE /cart/{id}                - Remove a line
//!
//! # Catalog
//! GET    /brands, /categories      - All, by name
//! POST   /brands, /categories      - Create (admin)
//!
//! # Addresses
//! POST   /address                  - Create
//! GET    /address/user/{id}        - A user's addresses
//! PATCH  /address/{id}             - Update
//! DELETE /address/{id}             - Delete
//!
//! # Reviews
//! POST   /reviews                  - Post a review
//! GET    /reviews/product/{id}     - A product's reviews (X-Total-Count)
//! PATCH  /reviews/{id}             - Edit
//! DELETE /reviews/{id}             - Delete
//!
//! # Wishlist
//! POST   /wishlist                 - Add a product
//! GET    /wishlist/user/{id}       - A user's wishlist (X-Total-Count)
//! PATCH  /wishlist/{id}            - Edit the note
//! DELETE /wishlist/{id}            - Remove
//! ```

pub mod addresses;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod extract;
pub mod health;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod users;
pub mod wishlist;

use axum::{
    Router,
    http::HeaderValue,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use bazaar_core::Page;
use serde::{Deserialize, Serialize};

use crate::config::{ApiConfig, RateLimitConfig};
use crate::middleware::{TOTAL_COUNT_HEADER, auth_rate_limiter};
use crate::state::AppState;
use extract::Json;

/// Body of responses that only carry a human-readable outcome.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `page` / `limit` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageParams {
    /// Validate into a [`Page`].
    ///
    /// # Errors
    ///
    /// Returns `PageError` for a zero page or an out-of-range limit.
    pub fn page(&self) -> Result<Page, bazaar_core::PageError> {
        Page::new(self.page, self.limit)
    }
}

/// A JSON list with its unpaginated size in `X-Total-Count`.
pub fn with_total_count<T: Serialize>(total: i64, items: Vec<T>) -> Response {
    let mut response = Json(items).into_response();
    response
        .headers_mut()
        .insert(TOTAL_COUNT_HEADER, HeaderValue::from(total));
    response
}

/// Create the auth routes router.
pub fn auth_routes(rate_limit: RateLimitConfig) -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
        .layer(auth_rate_limiter(rate_limit))
        .route("/logout", get(auth::logout))
        .route("/check-auth", get(auth::check_auth))
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/{id}", get(users::show).patch(users::update))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .patch(products::update)
                .delete(products::delete),
        )
        .route("/undelete/{id}", patch(products::undelete))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/user/{id}", get(orders::for_user))
        .route("/{id}", patch(orders::update_status))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(cart::add))
        .route("/user/{id}", get(cart::for_user).delete(cart::clear))
        .route("/{id}", patch(cart::update).delete(cart::remove))
}

/// Create the brand routes router.
pub fn brand_routes() -> Router<AppState> {
    Router::new().route("/", get(catalog::brands).post(catalog::create_brand))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(catalog::categories).post(catalog::create_category),
    )
}

/// Create the address routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(addresses::create))
        .route("/user/{id}", get(addresses::for_user))
        .route("/{id}", patch(addresses::update).delete(addresses::remove))
}

/// Create the review routes router.
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(reviews::create))
        .route("/product/{id}", get(reviews::for_product))
        .route("/{id}", patch(reviews::update).delete(reviews::remove))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(wishlist::add))
        .route("/user/{id}", get(wishlist::for_user))
        .route("/{id}", patch(wishlist::update).delete(wishlist::remove))
}

/// Create all routes for the API.
pub fn routes(config: &ApiConfig) -> Router<AppState> {
    Router::new()
        .route("/", get(health::running))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/auth", auth_routes(config.auth_rate_limit))
        .nest("/users", user_routes())
        .nest("/products", product_routes())
        .nest("/orders", order_routes())
        .nest("/cart", cart_routes())
        .nest("/brands", brand_routes())
        .nest("/categories", category_routes())
        .nest("/address", address_routes())
        .nest("/reviews", review_routes())
        .nest("/wishlist", wishlist_routes())
}
