//! Black-box HTTP tests for the Bazaar API.
//!
//! # Running Tests
//!
//! ```bash
//! # Prepare the database and start the server
//! cargo run -p bazaar-cli -- migrate
//! cargo run -p bazaar-cli -- seed crates/cli/seed/catalog.yaml
//! AUTH_RATE_LIMIT_BURST=1000 cargo run -p bazaar-api
//!
//! # In another shell
//! cargo test -p bazaar-integration-tests -- --ignored
//! ```
//!
//! `BAZAAR_API_URL` overrides the default `http://localhost:8000`. Every
//! test signs up its own user with a random email, so runs do not collide.
//! The raised burst keeps the credential rate limiter from rejecting the
//! suite's signups.
//!
//! Tests that need admin rights or a known reset token also connect to the
//! server's database through `BAZAAR_DATABASE_URL` (or `DATABASE_URL`).

use bazaar_api::db::reset_tokens::ResetTokenRepository;
use bazaar_api::db::users::UserRepository;
use bazaar_api::services::auth::hash_reset_token;
use bazaar_core::{Email, UserId};
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

/// Password used for every test account.
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Base URL of the API under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("BAZAAR_API_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// A unique, valid email address.
#[must_use]
pub fn unique_email() -> String {
    format!("it-{}@example.com", Uuid::new_v4().simple())
}

/// A unique catalog name such as `brand-3f2a...`.
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

/// The `X-Total-Count` header of a list response.
///
/// # Panics
///
/// Panics if the header is missing or not a number.
#[must_use]
pub fn total_count(resp: &Response) -> i64 {
    resp.headers()
        .get("x-total-count")
        .expect("No X-Total-Count header")
        .to_str()
        .expect("Header is not ASCII")
        .parse()
        .expect("Header is not a number")
}

/// A client that keeps the session cookie between requests.
///
/// # Panics
///
/// Panics if the HTTP client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Connect to the database the server under test uses.
///
/// # Panics
///
/// Panics if no database URL is set or the connection fails.
pub async fn pool() -> PgPool {
    let url = std::env::var("BAZAAR_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("BAZAAR_DATABASE_URL or DATABASE_URL must be set");
    bazaar_api::db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to the database")
}

/// Store `token` as the user's reset token, expiring at `expires_at`.
///
/// # Panics
///
/// Panics if the token cannot be stored.
pub async fn store_reset_token(pool: &PgPool, user_id: i64, token: &str, expires_at: DateTime<Utc>) {
    ResetTokenRepository::new(pool)
        .replace_for_user(user_key(user_id), &hash_reset_token(token), expires_at)
        .await
        .expect("Failed to store reset token");
}

/// Number of reset tokens on file for a user.
///
/// # Panics
///
/// Panics if the lookup fails.
pub async fn reset_token_count(pool: &PgPool, user_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM shop.password_reset_tokens WHERE user_id = $1")
        .bind(user_key(user_id))
        .fetch_one(pool)
        .await
        .expect("Failed to count reset tokens")
}

fn user_key(id: i64) -> UserId {
    UserId::new(i32::try_from(id).expect("user id fits in i32"))
}

/// A logged-in test user.
pub struct TestUser {
    pub client: Client,
    pub id: i64,
    pub email: String,
}

impl TestUser {
    /// Sign up a fresh user; the returned client carries its cookie.
    ///
    /// # Panics
    ///
    /// Panics if signup does not return 201.
    pub async fn signup() -> Self {
        let client = client();
        let email = unique_email();

        let resp = client
            .post(format!("{}/auth/signup", base_url()))
            .json(&json!({"name": "Integration Test", "email": email, "password": TEST_PASSWORD}))
            .send()
            .await
            .expect("Failed to sign up");
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = resp.json().await.expect("Signup body is not JSON");
        let id = body["_id"].as_i64().expect("Signup body has no _id");

        Self { client, id, email }
    }

    /// Sign up a fresh user and grant it admin rights.
    ///
    /// # Panics
    ///
    /// Panics if signup or the promotion fails.
    pub async fn admin(pool: &PgPool) -> Self {
        let user = Self::signup().await;
        user.set_admin(pool, true).await;
        user
    }

    /// Grant or revoke admin rights directly in the database.
    ///
    /// # Panics
    ///
    /// Panics if the update fails.
    pub async fn set_admin(&self, pool: &PgPool, is_admin: bool) {
        let email = Email::parse(&self.email).expect("test email is valid");
        UserRepository::new(pool)
            .set_admin(&email, is_admin)
            .await
            .expect("Failed to change admin flag");
    }

    /// GET `path` relative to the API base URL.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{path}", base_url()))
            .send()
            .await
            .expect("GET failed")
    }

    /// POST a JSON body to `path`.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn post(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(format!("{}{path}", base_url()))
            .json(body)
            .send()
            .await
            .expect("POST failed")
    }

    /// PATCH a JSON body to `path`.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn patch(&self, path: &str, body: &Value) -> Response {
        self.client
            .patch(format!("{}{path}", base_url()))
            .json(body)
            .send()
            .await
            .expect("PATCH failed")
    }

    /// DELETE `path`.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn delete(&self, path: &str) -> Response {
        self.client
            .delete(format!("{}{path}", base_url()))
            .send()
            .await
            .expect("DELETE failed")
    }
}

/// The id of some product that is not soft-deleted.
///
/// # Panics
///
/// Panics if the catalog is empty; seed it with `bazaar-cli seed` first.
pub async fn any_product_id(client: &Client) -> i64 {
    let products: Value = client
        .get(format!("{}/products?user=true&limit=1", base_url()))
        .send()
        .await
        .expect("Failed to list products")
        .json()
        .await
        .expect("Product list is not JSON");

    products[0]["_id"]
        .as_i64()
        .expect("No products; run `bazaar-cli seed` first")
}
