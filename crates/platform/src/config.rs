//! Platform configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PLATFORM_BASE_URL` - Public URL for the platform API
//! - `DOCSTORE_PROJECT_ID` - Document store project id
//! - `DOCSTORE_SERVICE_TOKEN` - Document store bearer token (high entropy)
//! - `IDENTITY_API_KEY` - Identity provider web API key (high entropy)
//!
//! ## Optional
//! - `PLATFORM_HOST` - Bind address (default: 127.0.0.1)
//! - `PLATFORM_PORT` - Listen port (default: 3000)
//! - `DOCSTORE_DATABASE_ID` - Database id (default: `(default)`)
//! - `DOCSTORE_EMULATOR_URL` - Document store emulator endpoint
//! - `IDENTITY_EMULATOR_URL` - Identity provider emulator endpoint
//! - `EMAIL_FUNCTIONS_URL` - Base URL of the email functions service;
//!   transactional email is disabled when unset
//! - `ADMIN_NOTIFY_EMAIL` - Where host-request emails are sent
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

use hackdeck_store::firestore::FirestoreConfig;
use hackdeck_store::identity::IdentityConfig;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Platform application configuration.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the platform
    pub base_url: String,
    /// Document store configuration
    pub firestore: FirestoreConfig,
    /// Identity provider configuration
    pub identity: IdentityConfig,
    /// Email functions service, if configured
    pub email_functions_url: Option<String>,
    /// Recipient for host-request emails
    pub admin_notify_email: Option<String>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
}

impl PlatformConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("PLATFORM_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("PLATFORM_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PLATFORM_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PLATFORM_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("PLATFORM_BASE_URL")?;
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("PLATFORM_BASE_URL".to_string(), e.to_string())
        })?;

        let firestore = firestore_from_env()?;
        let identity = identity_from_env(&base_url)?;

        Ok(Self {
            host,
            port,
            base_url,
            firestore,
            identity,
            email_functions_url: get_optional_env("EMAIL_FUNCTIONS_URL"),
            admin_notify_email: get_optional_env("ADMIN_NOTIFY_EMAIL"),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Load the document store configuration.
pub(crate) fn firestore_from_env() -> Result<FirestoreConfig, ConfigError> {
    Ok(FirestoreConfig {
        project_id: get_required_env("DOCSTORE_PROJECT_ID")?,
        database_id: get_env_or_default("DOCSTORE_DATABASE_ID", "(default)"),
        service_token: get_validated_secret("DOCSTORE_SERVICE_TOKEN")?,
        endpoint: get_optional_env("DOCSTORE_EMULATOR_URL"),
    })
}

fn identity_from_env(base_url: &str) -> Result<IdentityConfig, ConfigError> {
    Ok(IdentityConfig {
        api_key: get_validated_secret("IDENTITY_API_KEY")?,
        request_uri: base_url.to_owned(),
        endpoint: get_optional_env("IDENTITY_EMULATOR_URL"),
    })
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
pub(crate) fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
pub(crate) fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
pub(crate) fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real API keys and service tokens have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the real credential."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
pub(crate) fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_shannon_entropy_high() {
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }
}
