//! Password reset token repository.
//!
//! Only SHA-256 hashes of reset tokens are stored. A user has at most one
//! live token: issuing a new one replaces any previous rows.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use bazaar_core::{ResetTokenId, UserId};

use super::RepositoryError;

/// A stored reset token.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ResetToken {
    pub id: ResetTokenId,
    pub user_id: UserId,
    /// Hex-encoded SHA-256 of the raw token.
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ResetToken {
    /// Whether the token is past its expiry at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Repository for password reset tokens.
pub struct ResetTokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ResetTokenRepository<'a> {
    /// Create a new reset token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the newest token issued to a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_for_user(&self, user_id: UserId) -> Result<Option<ResetToken>, RepositoryError> {
        let token = sqlx::query_as::<_, ResetToken>(
            r"
            SELECT id, user_id, token_hash, expires_at, created_at
            FROM shop.password_reset_tokens
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            ",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(token)
    }

    /// Replace every token for a user with a new one, atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the transaction fails.
    pub async fn replace_for_user(
        &self,
        user_id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<ResetToken, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM shop.password_reset_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let token = sqlx::query_as::<_, ResetToken>(
            r"
            INSERT INTO shop.password_reset_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, token_hash, expires_at, created_at
            ",
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(token)
    }

    /// Delete a single token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ResetTokenId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM shop.password_reset_tokens WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Consume a token and set the user's new password hash in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the token was already consumed
    /// by a concurrent request.
    /// Returns `RepositoryError::Database` if the transaction fails.
    pub async fn redeem(
        &self,
        token: &ResetToken,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM shop.password_reset_tokens WHERE id = $1")
            .bind(token.id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query(
            r"
            UPDATE shop.users
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(token.user_id)
        .bind(password_hash)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
