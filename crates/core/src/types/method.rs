//! Sign-in method identifiers.
//!
//! A sign-in method is one credential type attached to an authentication
//! identity. An identity can have several linked methods and sign in via any
//! of them.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error parsing a provider identifier into a [`SignInMethod`].
#[derive(thiserror::Error, Debug, Clone)]
#[error("unknown sign-in method: {0}")]
pub struct MethodParseError(pub String);

/// A credential provider attached to an authentication identity.
///
/// The serialized form matches the provider identifiers reported by the auth
/// provider (`password`, `google.com`), so the enum round-trips through both
/// the session's provider list and the stored profile's linked-method list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignInMethod {
    /// Local email/password credential.
    #[serde(rename = "password")]
    Password,
    /// Federated Google sign-in.
    #[serde(rename = "google.com")]
    Google,
}

impl SignInMethod {
    /// The provider identifier string reported by the auth provider.
    #[must_use]
    pub const fn provider_id(self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::Google => "google.com",
        }
    }

    /// Human-readable name for user-facing copy ("registered with password,
    /// link Google?").
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::Google => "Google",
        }
    }

    /// Parse a provider identifier string.
    ///
    /// # Errors
    ///
    /// Returns `MethodParseError` for unrecognized provider identifiers.
    pub fn parse(s: &str) -> Result<Self, MethodParseError> {
        match s {
            "password" => Ok(Self::Password),
            "google.com" => Ok(Self::Google),
            other => Err(MethodParseError(other.to_owned())),
        }
    }
}

impl fmt::Display for SignInMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.provider_id())
    }
}

impl std::str::FromStr for SignInMethod {
    type Err = MethodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_id_roundtrip() {
        for method in [SignInMethod::Password, SignInMethod::Google] {
            assert_eq!(SignInMethod::parse(method.provider_id()).unwrap(), method);
        }
    }

    #[test]
    fn test_parse_unknown() {
        assert!(SignInMethod::parse("github.com").is_err());
    }

    #[test]
    fn test_serde_matches_provider_id() {
        let json = serde_json::to_string(&SignInMethod::Google).unwrap();
        assert_eq!(json, "\"google.com\"");

        let parsed: SignInMethod = serde_json::from_str("\"password\"").unwrap();
        assert_eq!(parsed, SignInMethod::Password);
    }
}
