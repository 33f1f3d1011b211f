//! Session middleware configuration.
//!
//! Cookie sessions backed by the in-memory store. Sessions are deliberately
//! ephemeral - created on sign-in, gone on sign-out, expiry, or process
//! restart - because the auth provider's own token mechanism is the durable
//! source of authentication state.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::PlatformConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "hd_session";

/// Session expiry time in seconds (7 days of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with the in-memory store.
#[must_use]
pub fn create_session_layer(config: &PlatformConfig) -> SessionManagerLayer<MemoryStore> {
    let store = MemoryStore::default();

    // Secure cookies whenever the public URL is HTTPS
    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
