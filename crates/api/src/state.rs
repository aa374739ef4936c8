//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::services::catalog::CatalogCache;
use crate::services::email::EmailService;

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("smtp configuration error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    mailer: EmailService,
    catalog: CatalogCache,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Mail is delivered over SMTP when the configuration has SMTP settings
    /// and logged otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP relay configuration is invalid.
    pub fn new(config: ApiConfig, pool: PgPool) -> Result<Self, StateError> {
        let mailer = match &config.email {
            Some(email) => EmailService::new(email)?,
            None => {
                tracing::warn!("SMTP not configured; password reset emails will only be logged");
                EmailService::log_only()
            }
        };

        Ok(Self::with_mailer(config, pool, mailer))
    }

    /// Create application state with an explicit mailer.
    #[must_use]
    pub fn with_mailer(config: ApiConfig, pool: PgPool, mailer: EmailService) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                mailer,
                catalog: CatalogCache::new(),
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the email service.
    #[must_use]
    pub fn mailer(&self) -> &EmailService {
        &self.inner.mailer
    }

    /// Get a reference to the brand/category cache.
    #[must_use]
    pub fn catalog(&self) -> &CatalogCache {
        &self.inner.catalog
    }
}
