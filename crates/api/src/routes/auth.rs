//! Authentication route handlers.
//!
//! Successful signup and login store the user in the session, which the
//! session layer writes to the `token` cookie.

use axum::{extract::State, http::StatusCode};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
use crate::models::user::{
    ForgotPasswordRequest, LoginRequest, ResetPasswordRequest, SignupRequest,
};
use crate::models::{CurrentUser, SanitizedUser, User};
use crate::routes::MessageBody;
use crate::routes::extract::Json;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

fn auth_service(state: &AppState) -> AuthService<'_> {
    AuthService::new(state.pool(), state.mailer(), state.config())
}

async fn log_in(session: &Session, user: &User) -> Result<()> {
    set_current_user(session, &CurrentUser::from(user)).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

/// Create an account and log it in.
///
/// POST /auth/signup
#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SanitizedUser>)> {
    let user = auth_service(&state)
        .signup(&body.name, &body.email, &body.password)
        .await?;

    log_in(&session, &user).await?;

    Ok((StatusCode::CREATED, Json(SanitizedUser::from(user))))
}

/// Log in with email and password.
///
/// POST /auth/login
///
/// Any failure drops the current session so a stale cookie does not
/// outlive a failed attempt.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SanitizedUser>> {
    match auth_service(&state).login(&body.email, &body.password).await {
        Ok(user) => {
            log_in(&session, &user).await?;
            Ok(Json(SanitizedUser::from(user)))
        }
        Err(e) => {
            tracing::warn!("Login failed: {e}");
            clear_current_user(&session).await?;
            Err(e.into())
        }
    }
}

/// Email a password reset link.
///
/// POST /auth/forgot-password
#[instrument(skip_all)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageBody>> {
    let user = auth_service(&state).forgot_password(&body.email).await?;

    Ok(Json(MessageBody::new(format!(
        "Password reset link sent to {}",
        user.email.as_str()
    ))))
}

/// Set a new password using an emailed reset link.
///
/// POST /auth/reset-password
#[instrument(skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<MessageBody>> {
    auth_service(&state)
        .reset_password(body.user_id, &body.token, &body.password)
        .await?;

    Ok(Json(MessageBody::new("Password updated successfully")))
}

/// Log out.
///
/// GET /auth/logout
pub async fn logout(
    session: Session,
    OptionalAuth(current): OptionalAuth,
) -> Result<Json<MessageBody>> {
    clear_current_user(&session).await?;
    if let Some(user) = current {
        tracing::info!(user_id = %user.id, "User logged out");
    }
    clear_sentry_user();

    Ok(Json(MessageBody::new("Logout successful")))
}

/// Return the logged-in user, freshly loaded.
///
/// GET /auth/check-auth
pub async fn check_auth(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
) -> Result<Json<SanitizedUser>> {
    match auth_service(&state).get_user(current.id).await {
        Ok(user) => Ok(Json(SanitizedUser::from(user))),
        Err(AuthError::UserNotFound) => {
            clear_current_user(&session).await?;
            Err(AppError::Unauthorized("Unauthorized".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}
