//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! bazaar-cli migrate
//! ```
//!
//! Runs the SQL migrations in `crates/api/migrations/`, then creates the
//! `tower_sessions` schema used by the session store. Both steps are
//! idempotent.

use tower_sessions_sqlx_store::PostgresStore;

use super::{CliError, connect};

/// Run all migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running schema migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Running session store migration...");
    PostgresStore::new(pool)
        .migrate()
        .await
        .map_err(|e| CliError::SessionStore(e.to_string()))?;

    tracing::info!("Migrations complete!");
    Ok(())
}
