//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`.
//! Provider and store errors are never surfaced raw; they map to user-facing
//! copy here.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use hackdeck_store::db::RepositoryError;

use crate::services::auth::AuthError;

/// Application-level error type for the platform.
#[derive(Debug, Error)]
pub enum AppError {
    /// Repository/document store operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but not allowed to do this.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Conflict with existing state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Repository(_) | Self::Internal(_))
            || matches!(&self, Self::Auth(AuthError::Identity(_) | AuthError::Repository(_)))
        {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Repository(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials
                | AuthError::SessionExpired
                | AuthError::ProfileUnavailable => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists | AuthError::CredentialAlreadyLinked => {
                    StatusCode::CONFLICT
                }
                AuthError::AccountDisabled => StatusCode::FORBIDDEN,
                AuthError::WeakPassword(_)
                | AuthError::InvalidEmail(_)
                | AuthError::LastMethod
                | AuthError::MethodNotLinked
                | AuthError::InvalidLinkState => StatusCode::BAD_REQUEST,
                AuthError::LinkFailed => StatusCode::UNPROCESSABLE_ENTITY,
                AuthError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
                AuthError::Identity(_) | AuthError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Repository(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid email or password".to_string(),
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists".to_string()
                }
                AuthError::AccountDisabled => "This account has been disabled".to_string(),
                AuthError::TooManyRequests => {
                    "Too many attempts, please try again later".to_string()
                }
                AuthError::SessionExpired | AuthError::ProfileUnavailable => {
                    "Please sign in again".to_string()
                }
                AuthError::CredentialAlreadyLinked => {
                    "This credential is already in use by another account".to_string()
                }
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::LastMethod => {
                    "You can't remove your only sign-in method".to_string()
                }
                AuthError::MethodNotLinked => "That sign-in method is not linked".to_string(),
                AuthError::InvalidLinkState => {
                    "No account linking in progress, please start over".to_string()
                }
                AuthError::LinkFailed => {
                    "Linking didn't complete, please try again".to_string()
                }
                AuthError::Identity(_) | AuthError::Repository(_) => {
                    "Authentication error".to_string()
                }
            },
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from an identity id.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(uid: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(uid.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on sign-out to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("project-123".to_string());
        assert_eq!(err.to_string(), "Not found: project-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::LastMethod)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::UserAlreadyExists)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::ProfileUnavailable)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_auth_errors_map_to_copy_not_raw() {
        let response = AppError::Auth(AuthError::InvalidCredentials).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
