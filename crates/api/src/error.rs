//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. Every error response is JSON of the form
//! `{"message": "..."}`. All route handlers should return `Result<T, AppError>`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bazaar_core::PageError;
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::db::products::ProductQueryError;
use crate::models::ValidationError;
use crate::services::auth::AuthError;
use crate::services::orders::OrderError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Order operation failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Request payload failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Malformed product list query.
    #[error("Query error: {0}")]
    ProductQuery(#[from] ProductQueryError),

    /// Invalid `page` / `limit` parameters.
    #[error("Pagination error: {0}")]
    Page(#[from] PageError),

    /// Session store failure.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but may not do this.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

const INTERNAL_MESSAGE: &str = "Internal server error";

fn repository_response(err: &RepositoryError) -> (StatusCode, String) {
    match err {
        RepositoryError::NotFound => (StatusCode::NOT_FOUND, "Resource not found".to_string()),
        RepositoryError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        RepositoryError::InvalidReference(_) => (
            StatusCode::BAD_REQUEST,
            "Referenced resource does not exist".to_string(),
        ),
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
        }
    }
}

fn auth_response(err: &AuthError) -> (StatusCode, String) {
    match err {
        AuthError::InvalidEmail(_) => (StatusCode::BAD_REQUEST, "Invalid email address".to_string()),
        AuthError::InvalidName => (StatusCode::BAD_REQUEST, "Name is required".to_string()),
        AuthError::WeakPassword(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        AuthError::UserAlreadyExists => (StatusCode::BAD_REQUEST, "User already exists".to_string()),
        AuthError::InvalidCredentials => (StatusCode::NOT_FOUND, "Invalid Credentials".to_string()),
        AuthError::UserNotFound => (StatusCode::NOT_FOUND, "User does not exist".to_string()),
        AuthError::EmailNotFound => (
            StatusCode::NOT_FOUND,
            "Provided email does not exist".to_string(),
        ),
        AuthError::ResetLinkInvalid => (StatusCode::NOT_FOUND, "Reset link is not valid".to_string()),
        AuthError::ResetLinkExpired => (StatusCode::NOT_FOUND, "Reset link has expired".to_string()),
        AuthError::Repository(e) => repository_response(e),
        AuthError::PasswordHash | AuthError::Mail(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
        }
    }
}

fn order_response(err: &OrderError) -> (StatusCode, String) {
    match err {
        OrderError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
        OrderError::ProductUnavailable(_) | OrderError::InvalidTransition { .. } => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        OrderError::NotFound => (StatusCode::NOT_FOUND, "Order not found".to_string()),
        OrderError::Repository(e) => repository_response(e),
    }
}

impl AppError {
    /// Status code and client-facing message.
    ///
    /// Server errors get a generic message so internals never reach clients.
    #[must_use]
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Database(e) => repository_response(e),
            Self::Auth(e) => auth_response(e),
            Self::Order(e) => order_response(e),
            Self::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::ProductQuery(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::Page(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::Session(_) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
            }
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(ErrorBody { message })).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(get_status(AppError::RateLimited), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            get_status(AppError::Internal("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_error_mapping() {
        let cases = [
            (AuthError::UserAlreadyExists, StatusCode::BAD_REQUEST, "User already exists"),
            (AuthError::InvalidCredentials, StatusCode::NOT_FOUND, "Invalid Credentials"),
            (AuthError::UserNotFound, StatusCode::NOT_FOUND, "User does not exist"),
            (
                AuthError::EmailNotFound,
                StatusCode::NOT_FOUND,
                "Provided email does not exist",
            ),
            (AuthError::ResetLinkInvalid, StatusCode::NOT_FOUND, "Reset link is not valid"),
            (AuthError::ResetLinkExpired, StatusCode::NOT_FOUND, "Reset link has expired"),
        ];

        for (err, status, message) in cases {
            assert_eq!(
                AppError::from(err).status_and_message(),
                (status, message.to_string())
            );
        }
    }

    #[test]
    fn test_repository_error_mapping() {
        assert_eq!(
            get_status(RepositoryError::NotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(RepositoryError::Conflict("brand already exists".to_string()))
                .status_and_message(),
            (StatusCode::BAD_REQUEST, "brand already exists".to_string())
        );
        assert_eq!(
            get_status(RepositoryError::InvalidReference("fk".to_string()).into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_page_error_is_bad_request() {
        assert_eq!(
            AppError::from(PageError::ZeroPage).status_and_message(),
            (StatusCode::BAD_REQUEST, "page must be at least 1".to_string())
        );
    }

    #[test]
    fn test_server_errors_hide_details() {
        let err = AppError::Database(RepositoryError::DataCorruption("secret detail".to_string()));
        let (status, message) = err.status_and_message();

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Internal server error");
    }

    #[tokio::test]
    async fn test_error_body_is_json_message() {
        let response = AppError::NotFound("Product not found".to_string()).into_response();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body, serde_json::json!({"message": "Product not found"}));
    }
}
