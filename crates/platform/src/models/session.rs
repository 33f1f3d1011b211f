//! Session-related types.
//!
//! Types stored in the cookie session for authentication state. The session
//! is ephemeral: created on sign-in, destroyed on sign-out or when the
//! provider token expires, never persisted anywhere else.

use serde::{Deserialize, Serialize};

use hackdeck_core::{Email, SignInMethod, Uid};
use hackdeck_store::identity::AuthSession;

/// Session-stored user identity.
///
/// Minimal data to identify the signed-in user plus the provider token for
/// acting on their behalf. The `providers` list is a snapshot from sign-in
/// time; render-time displays re-read the live list from the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Authentication identity id.
    pub uid: Uid,
    /// User's email address.
    pub email: Email,
    /// Provider session token.
    pub id_token: String,
    /// Linked methods as of the last auth event on this session.
    pub providers: Vec<SignInMethod>,
}

impl CurrentUser {
    /// Build the session record from a provider session.
    #[must_use]
    pub fn from_auth_session(session: &AuthSession) -> Self {
        Self {
            uid: session.uid.clone(),
            email: session.email.clone(),
            id_token: session.id_token.clone(),
            providers: session.providers.clone(),
        }
    }
}

/// Session keys for authentication data.
pub mod session_keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the pending credential-linking flow state.
    pub const LINK_FLOW: &str = "link_flow";
}
