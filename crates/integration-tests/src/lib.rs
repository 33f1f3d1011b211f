//! Integration tests for HackDeck.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the document store and identity emulators, then the services:
//! cargo run -p hackdeck-platform &
//! cargo run -p hackdeck-admin &
//! cargo run -p hackdeck-functions &
//!
//! # Run integration tests
//! cargo test -p hackdeck-integration-tests -- --ignored
//! ```
//!
//! # Environment
//!
//! - `PLATFORM_BASE_URL` - platform under test (default `http://localhost:3000`)
//! - `ADMIN_BASE_URL` - admin under test (default `http://localhost:3001`)
//! - `ADMIN_API_TOKEN` - bearer token for admin routes
//!
//! # Test Categories
//!
//! - `platform_auth` - registration, sign-in, linking, unlink guard
//! - `platform_projects` - project CRUD and engagement
//! - `admin_dashboard` - analytics and management routes

/// Base URL for the platform API (configurable via environment).
#[must_use]
pub fn platform_base_url() -> String {
    std::env::var("PLATFORM_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL for the admin API (configurable via environment).
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// A cookie-holding client, so the session survives across requests.
///
/// # Panics
///
/// Panics if the TLS backend cannot be initialized.
#[must_use]
pub fn session_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique throwaway email for one test run.
#[must_use]
pub fn test_email(tag: &str) -> String {
    format!("it-{tag}-{}@hackdeck.test", uuid::Uuid::new_v4().simple())
}
