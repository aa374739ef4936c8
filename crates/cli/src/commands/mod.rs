//! CLI command implementations.

pub mod migrate;
pub mod seed;
pub mod user;

use bazaar_api::db::{self, RepositoryError};
use bazaar_core::EmailError;
use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Session store migration failed.
    #[error("Session store error: {0}")]
    SessionStore(String),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// No user has the given email.
    #[error("No user with email: {0}")]
    UserNotFound(String),

    /// Seed file could not be read.
    #[error("Cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Seed file is not valid YAML for the catalog schema.
    #[error("Invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Seed file content failed validation.
    #[error("Invalid seed data: {0}")]
    Seed(String),
}

/// Connect using `BAZAAR_DATABASE_URL`, falling back to `DATABASE_URL`.
pub(crate) async fn connect() -> Result<PgPool, CliError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("BAZAAR_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("BAZAAR_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&database_url).await?)
}
