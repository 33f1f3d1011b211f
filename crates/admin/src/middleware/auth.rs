//! Admin authentication.
//!
//! Every admin route requires a static bearer token from configuration;
//! the service itself is expected to sit on an internal network.

use axum::{extract::FromRequestParts, http::request::Parts};
use secrecy::ExposeSecret;

use crate::error::AdminError;
use crate::state::AdminState;

/// Extractor that requires the admin bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(_admin: RequireAdminToken) -> impl IntoResponse {
///     "hello, admin"
/// }
/// ```
pub struct RequireAdminToken;

impl FromRequestParts<AdminState> for RequireAdminToken {
    type Rejection = AdminError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AdminState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(AdminError::Unauthorized)?;

        if presented != state.config().admin_token.expose_secret() {
            return Err(AdminError::Unauthorized);
        }

        Ok(Self)
    }
}
