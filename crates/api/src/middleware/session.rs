//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. The session
//! cookie is named `token`, is HTTP-only, and is cross-site capable
//! (`SameSite=None; Secure`) in production so a browser client on another
//! origin can send it.

use sqlx::PgPool;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::ApiConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "token";

/// Cookie attributes derived from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    pub secure: bool,
    pub same_site: SameSite,
    pub max_age_days: i64,
}

impl CookiePolicy {
    /// Cookie policy for `config`.
    #[must_use]
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            secure: config.production,
            same_site: if config.production {
                SameSite::None
            } else {
                SameSite::Lax
            },
            max_age_days: config.cookie_expiration_days,
        }
    }
}

/// Create the `PostgreSQL` session store.
///
/// The `tower_sessions.session` table is created by `bazaar-cli migrate`.
#[must_use]
pub fn create_session_store(pool: &PgPool) -> PostgresStore {
    PostgresStore::new(pool.clone())
}

/// Create the session layer.
#[must_use]
pub fn create_session_layer(
    store: PostgresStore,
    config: &ApiConfig,
) -> SessionManagerLayer<PostgresStore> {
    let policy = CookiePolicy::from_config(config);

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::days(policy.max_age_days)))
        .with_secure(policy.secure)
        .with_same_site(policy.same_site)
        .with_http_only(true)
        .with_path("/")
}
