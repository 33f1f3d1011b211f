//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DOCSTORE_PROJECT_ID` - Document store project id
//! - `DOCSTORE_SERVICE_TOKEN` - Document store bearer token
//! - `ADMIN_API_TOKEN` - Bearer token admin clients must present
//!   (min 32 chars, not a placeholder)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `DOCSTORE_DATABASE_ID` - Database id (default: `(default)`)
//! - `DOCSTORE_EMULATOR_URL` - Document store emulator endpoint
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

use hackdeck_store::firestore::FirestoreConfig;

const MIN_ADMIN_TOKEN_LENGTH: usize = 32;

/// Placeholder fragments that must not appear in the admin token.
const PLACEHOLDER_PATTERNS: &[&str] = &["changeme", "example", "secret", "password", "your-"];

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

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Document store configuration
    pub firestore: FirestoreConfig,
    /// Bearer token admin clients must present
    pub admin_token: SecretString,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// the admin token fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let host = env_or("ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_string(), e.to_string()))?;
        let port = env_or("ADMIN_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_string(), e.to_string()))?;

        let admin_token = required("ADMIN_API_TOKEN")?;
        validate_admin_token(&admin_token)?;

        Ok(Self {
            host,
            port,
            firestore: FirestoreConfig {
                project_id: required("DOCSTORE_PROJECT_ID")?,
                database_id: env_or("DOCSTORE_DATABASE_ID", "(default)"),
                service_token: SecretString::from(required("DOCSTORE_SERVICE_TOKEN")?),
                endpoint: std::env::var("DOCSTORE_EMULATOR_URL").ok(),
            },
            admin_token: SecretString::from(admin_token),
            sentry_dsn: std::env::var("SENTRY_DSN").ok(),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn validate_admin_token(token: &str) -> Result<(), ConfigError> {
    if token.len() < MIN_ADMIN_TOKEN_LENGTH {
        return Err(ConfigError::InsecureSecret(
            "ADMIN_API_TOKEN".to_string(),
            format!(
                "must be at least {MIN_ADMIN_TOKEN_LENGTH} characters (got {})",
                token.len()
            ),
        ));
    }

    let lower = token.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                "ADMIN_API_TOKEN".to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

fn required(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_admin_token_too_short() {
        assert!(matches!(
            validate_admin_token("short"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn test_validate_admin_token_placeholder() {
        assert!(matches!(
            validate_admin_token("changeme-changeme-changeme-changeme"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn test_validate_admin_token_valid() {
        assert!(validate_admin_token("fJ8z2kQ9vX4mL7pA3wN6tE1rY5uB0cD8").is_ok());
    }
}
