//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{Email, UserId};

/// A storefront account.
///
/// The password hash is deliberately not part of this type; repositories
/// return it separately only where it is needed for verification.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Normalized email address.
    pub email: Email,
    /// Whether the email has been verified.
    pub is_verified: bool,
    /// Whether the user can manage the catalog and all orders.
    pub is_admin: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The public view of a [`User`], safe to send to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizedUser {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub is_verified: bool,
    pub is_admin: bool,
}

impl From<&User> for SanitizedUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            is_verified: user.is_verified,
            is_admin: user.is_admin,
        }
    }
}

impl From<User> for SanitizedUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            is_verified: user.is_verified,
            is_admin: user.is_admin,
        }
    }
}

/// Signup request body.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Forgot-password request body.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Reset-password request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub user_id: UserId,
    pub token: String,
    pub password: String,
}

/// Profile update request body.
#[derive(Debug, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: UserId::new(3),
            name: "Ada".to_string(),
            email: Email::parse("ada@example.com").unwrap(),
            is_verified: true,
            is_admin: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_sanitized_user_shape() {
        let json = serde_json::to_value(SanitizedUser::from(&sample_user())).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "_id": 3,
                "name": "Ada",
                "email": "ada@example.com",
                "isVerified": true,
                "isAdmin": false,
            })
        );
    }

    #[test]
    fn test_sanitized_user_has_no_secrets() {
        let json = serde_json::to_string(&SanitizedUser::from(sample_user())).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("createdAt"));
    }

    #[test]
    fn test_reset_request_uses_camel_case() {
        let body: ResetPasswordRequest =
            serde_json::from_str(r#"{"userId": 5, "token": "t", "password": "p"}"#).unwrap();
        assert_eq!(body.user_id, UserId::new(5));
    }
}
