//! Email functions configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SMTP_HOST` - SMTP relay hostname
//! - `SMTP_USERNAME` - SMTP authentication username
//! - `SMTP_PASSWORD` - SMTP authentication password
//! - `EMAIL_FROM_ADDRESS` - Sender address for all outgoing mail
//!
//! ## Optional
//! - `FUNCTIONS_HOST` - Bind address (default: 127.0.0.1)
//! - `FUNCTIONS_PORT` - Listen port (default: 3002)
//! - `SMTP_PORT` - SMTP relay port (default: 587)
//! - `PLATFORM_URL` - Public platform URL used in email bodies
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// SMTP delivery configuration.
#[derive(Clone)]
pub struct EmailConfig {
    /// SMTP server hostname
    pub smtp_host: String,
    /// SMTP server port
    pub smtp_port: u16,
    /// SMTP authentication username
    pub smtp_username: String,
    /// SMTP authentication password
    pub smtp_password: SecretString,
    /// Email sender address (From header)
    pub from_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

/// Functions application configuration.
#[derive(Debug, Clone)]
pub struct FunctionsConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// SMTP delivery settings
    pub email: EmailConfig,
    /// Public platform URL rendered into email bodies
    pub platform_url: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl FunctionsConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let host = env_or("FUNCTIONS_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("FUNCTIONS_HOST".to_string(), e.to_string()))?;
        let port = env_or("FUNCTIONS_PORT", "3002")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("FUNCTIONS_PORT".to_string(), e.to_string()))?;

        let smtp_port = env_or("SMTP_PORT", "587")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SMTP_PORT".to_string(), e.to_string()))?;

        Ok(Self {
            host,
            port,
            email: EmailConfig {
                smtp_host: required("SMTP_HOST")?,
                smtp_port,
                smtp_username: required("SMTP_USERNAME")?,
                smtp_password: SecretString::from(required("SMTP_PASSWORD")?),
                from_address: required("EMAIL_FROM_ADDRESS")?,
            },
            platform_url: env_or("PLATFORM_URL", "https://hackdeck.dev"),
            sentry_dsn: std::env::var("SENTRY_DSN").ok(),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn required(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
