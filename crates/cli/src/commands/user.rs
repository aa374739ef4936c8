//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! bazaar-cli user promote -e admin@example.com
//! bazaar-cli user demote -e admin@example.com
//! ```
//!
//! The user must already have signed up through the API.

use bazaar_api::db::RepositoryError;
use bazaar_api::db::users::UserRepository;
use bazaar_core::Email;

use super::{CliError, connect};

/// Grant or revoke admin rights.
///
/// # Errors
///
/// Returns an error if the email is malformed, no user has it, or the
/// database is unreachable.
pub async fn set_admin(email: &str, is_admin: bool) -> Result<(), CliError> {
    let email = Email::parse(email)?;
    let pool = connect().await?;

    let user = UserRepository::new(&pool)
        .set_admin(&email, is_admin)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => CliError::UserNotFound(email.as_str().to_owned()),
            other => other.into(),
        })?;

    tracing::info!(
        user_id = %user.id,
        email = %user.email.as_str(),
        is_admin = user.is_admin,
        "User updated"
    );
    Ok(())
}
