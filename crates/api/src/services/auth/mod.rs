//! Authentication service.
//!
//! Password signup and login, plus the password reset flow: a random token
//! is mailed to the user while only its SHA-256 hash is stored, with an
//! expiry timestamp.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use bazaar_core::{Email, UserId};

use crate::config::ApiConfig;
use crate::db::RepositoryError;
use crate::db::reset_tokens::ResetTokenRepository;
use crate::db::users::UserRepository;
use crate::models::User;
use crate::services::email::EmailService;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Random bytes in a reset token before encoding.
const RESET_TOKEN_BYTES: usize = 32;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    reset_tokens: ResetTokenRepository<'a>,
    mailer: &'a EmailService,
    config: &'a ApiConfig,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, mailer: &'a EmailService, config: &'a ApiConfig) -> Self {
        Self {
            users: UserRepository::new(pool),
            reset_tokens: ResetTokenRepository::new(pool),
            mailer,
            config,
        }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::InvalidName` if the name is blank.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::InvalidName);
        }
        validate_password(password)?;

        if self.users.get_by_email(&email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(name, &email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "User signed up");
        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Issue a reset token for the account with `email` and mail the link.
    ///
    /// Any previously issued token for the user stops working.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::EmailNotFound` if no account uses the email.
    /// Returns `AuthError::Mail` if the email could not be sent.
    pub async fn forgot_password(&self, email: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::EmailNotFound)?;

        let token = generate_reset_token();
        let expires_at = Utc::now() + self.config.password_reset_ttl();
        self.reset_tokens
            .replace_for_user(user.id, &hash_reset_token(&token), expires_at)
            .await?;

        let link = self.config.reset_password_link(user.id, &token);
        self.mailer
            .send_password_reset(
                user.email.as_str(),
                &user.name,
                &link,
                self.config.password_reset_expiration_minutes,
            )
            .await?;

        tracing::info!(user_id = %user.id, "Password reset link issued");
        Ok(user)
    }

    /// Set a new password using a mailed reset token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the new password is too short.
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    /// Returns `AuthError::ResetLinkInvalid` if no token is on file.
    /// Returns `AuthError::ResetLinkExpired` if the token expired or doesn't match.
    pub async fn reset_password(
        &self,
        user_id: UserId,
        token: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        validate_password(password)?;

        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let stored = self
            .reset_tokens
            .find_for_user(user.id)
            .await?
            .ok_or(AuthError::ResetLinkInvalid)?;

        if stored.is_expired_at(Utc::now()) {
            self.reset_tokens.delete(stored.id).await?;
            return Err(AuthError::ResetLinkExpired);
        }

        if hash_reset_token(token) != stored.token_hash {
            return Err(AuthError::ResetLinkExpired);
        }

        let password_hash = hash_password(password)?;
        self.reset_tokens
            .redeem(&stored, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::ResetLinkInvalid,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "Password reset");
        Ok(())
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password with argon2id and a random salt.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// A fresh URL-safe reset token.
fn generate_reset_token() -> String {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hex SHA-256 of a raw reset token, as stored in the database.
#[must_use]
pub fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-hash"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("12345678").is_ok());
        assert!(matches!(
            validate_password("1234567"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_reset_tokens_are_unique_and_url_safe() {
        let a = generate_reset_token();
        let b = generate_reset_token();

        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(
            a.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_reset_token_hash() {
        let token = generate_reset_token();
        let hash = hash_reset_token(&token);

        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_reset_token(&token));
        assert_ne!(hash, hash_reset_token("tampered"));
        assert_ne!(hash, token);
    }
}
