//! User repository for database operations.

use sqlx::PgPool;

use bazaar_core::{Email, UserId};

use super::RepositoryError;
use crate::models::User;

const USER_COLUMNS: &str = "id, name, email, is_verified, is_admin, created_at, updated_at";

/// A user row together with its stored password hash.
#[derive(sqlx::FromRow)]
struct UserWithHash {
    #[sqlx(flatten)]
    user: User,
    password_hash: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM shop.users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM shop.users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user and their password hash by email, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithHash>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM shop.users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| (r.user, r.password_hash)))
    }

    /// Create a new user with a password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(&format!(
            r"
            INSERT INTO shop.users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "email already exists"))
    }

    /// Change a user's display name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_name(&self, id: UserId, name: &str) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(&format!(
            r"
            UPDATE shop.users
            SET name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(name)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Grant or revoke admin rights by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has that email.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_admin(&self, email: &Email, is_admin: bool) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(&format!(
            r"
            UPDATE shop.users
            SET is_admin = $2, updated_at = NOW()
            WHERE email = $1
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(email)
        .bind(is_admin)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
