//! Database operations for the storefront `PostgreSQL` database.
//!
//! # Schema: `shop`
//!
//! ## Tables
//!
//! - `users` - Accounts with argon2 password hashes
//! - `password_reset_tokens` - Hashed, time-limited reset credentials
//! - `brands`, `categories` - Catalog taxonomy
//! - `products` - Catalog items (soft-deleted via `is_deleted`)
//! - `cart_items` - One row per (user, product) in a user's cart
//! - `orders` - Placed orders with item and address snapshots
//! - `addresses` - User shipping addresses
//! - `reviews` - Product reviews
//! - `wishlist_items` - Saved products
//!
//! Sessions live in `tower_sessions.session`, managed by the session store.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p bazaar-cli -- migrate
//! ```

pub mod addresses;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod products;
pub mod reset_tokens;
pub mod reviews;
pub mod users;
pub mod wishlist;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A referenced row (e.g., the brand of a new product) does not exist.
    #[error("invalid reference: {0}")]
    InvalidReference(String),
}

impl RepositoryError {
    /// Classify a write error, turning unique and foreign-key violations into
    /// `Conflict` and `InvalidReference`.
    pub(crate) fn from_write(err: sqlx::Error, conflict: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return Self::Conflict(conflict.to_owned());
            }
            if db_err.is_foreign_key_violation() {
                let constraint = db_err.constraint().unwrap_or("foreign key").to_owned();
                return Self::InvalidReference(constraint);
            }
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
