//! Authentication extractors.
//!
//! Handlers declare what they need: [`RequireAuth`] for any logged-in user,
//! [`RequireAdmin`] for catalog and order management, [`OptionalAuth`] where
//! anonymous access is fine.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use bazaar_core::UserId;

use crate::db::users::UserRepository;
use crate::error::AppError;
use crate::models::{CurrentUser, User, session_keys};
use crate::state::AppState;

/// Extractor that requires authentication.
///
/// Rejects with `401 {"message": "Unauthorized"}` when no user is logged in.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;

        let user: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;

        Ok(Self(user))
    }
}

impl RequireAuth {
    /// Reject unless the logged-in user is `owner`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` otherwise.
    pub fn ensure_owner(&self, owner: UserId) -> Result<(), AppError> {
        if self.0.owns(owner) {
            Ok(())
        } else {
            Err(AppError::Forbidden("Forbidden".to_string()))
        }
    }

    /// Reject unless the logged-in user is `owner` or currently an admin.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` otherwise, or a database error from the
    /// admin lookup.
    pub async fn ensure_can_access(&self, state: &AppState, owner: UserId) -> Result<(), AppError> {
        if self.0.owns(owner) || load_user(state, self.0.id).await?.is_admin {
            Ok(())
        } else {
            Err(AppError::Forbidden("Forbidden".to_string()))
        }
    }
}

/// Load the session user's row; a deleted account is no longer logged in.
async fn load_user(state: &AppState, id: UserId) -> Result<User, AppError> {
    UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))
}

/// Extractor that requires an admin.
///
/// The admin flag is read from the database on every request, so a revoked
/// admin loses access immediately.
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(session_user) = RequireAuth::from_request_parts(parts, state).await?;

        let user = load_user(state, session_user.id).await?;

        if !user.is_admin {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(Self(CurrentUser::from(&user)))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if the user is not logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Log a user in: rotate the session ID, then store the user.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Log a user out: delete the session and its cookie.
///
/// # Errors
///
/// Returns an error if the session cannot be deleted from the store.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
