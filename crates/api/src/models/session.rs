//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use bazaar_core::{Email, UserId};

use super::User;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
/// Roles are not cached here; admin checks always go to the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
}

impl CurrentUser {
    /// Whether `owner` is this user.
    #[must_use]
    pub fn owns(&self, owner: UserId) -> bool {
        self.id == owner
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(id: i32) -> CurrentUser {
        CurrentUser {
            id: UserId::new(id),
            email: Email::parse("someone@example.com").unwrap(),
        }
    }

    #[test]
    fn test_owns_own_data() {
        assert!(user(1).owns(UserId::new(1)));
    }

    #[test]
    fn test_does_not_own_other_data() {
        assert!(!user(1).owns(UserId::new(2)));
    }

    #[test]
    fn test_sessions_with_legacy_admin_flag_still_load() {
        let json = r#"{"id":7,"email":"someone@example.com","is_admin":true}"#;
        let current: CurrentUser = serde_json::from_str(json).unwrap();
        assert_eq!(current, user(7));
    }
}
