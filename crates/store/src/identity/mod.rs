//! Managed auth provider client.
//!
//! Wraps the identity service's REST surface: password and federated
//! (Google) sign-in, sign-in-methods-for-email, credential link/unlink,
//! session lookup, and account deletion.
//!
//! The [`AuthProvider`] trait is the seam the auth flows are written
//! against: the platform injects [`IdentityClient`] in production and an
//! in-memory fake in tests. Provider error codes are parsed into
//! [`IdentityError`] here; user-facing copy is mapped at the route edge,
//! never from raw provider messages.

mod types;

pub use types::{AccountInfo, AuthSession, FederatedSignIn, ProviderUserInfo};

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use thiserror::Error;

use hackdeck_core::{Email, SignInMethod, Uid};

use types::{
    AuthUriResponse, IdentityErrorEnvelope, IdpAuthResponse, LookupResponse,
    PasswordAuthResponse, UpdateAccountResponse, parse_methods,
};

/// Errors that can occur when talking to the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The email is already registered.
    #[error("email already in use")]
    EmailExists,

    /// Wrong password or unknown email. Deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account has been disabled by an administrator.
    #[error("account disabled")]
    UserDisabled,

    /// The provider is throttling this client.
    #[error("too many attempts, try again later")]
    TooManyRequests,

    /// The federated credential is already linked to another account.
    #[error("credential already linked to another account")]
    CredentialAlreadyLinked,

    /// The session token is expired or invalid.
    #[error("session expired")]
    SessionExpired,

    /// The operation needs a recent sign-in; re-authenticate first.
    #[error("recent sign-in required")]
    RequiresRecentLogin,

    /// Any other provider error.
    #[error("identity API error ({code}): {message}")]
    Api { code: u16, message: String },

    /// Failed to parse a response body.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The provider returned a structurally valid but unusable response.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

impl IdentityError {
    /// Map a provider error-message code to a typed error.
    fn from_code(code: u16, message: &str) -> Self {
        // Messages look like "EMAIL_EXISTS" or "TOO_MANY_ATTEMPTS_TRY_LATER : ..."
        let head = message.split_whitespace().next().unwrap_or(message);
        match head {
            "EMAIL_EXISTS" => Self::EmailExists,
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
                Self::InvalidCredentials
            }
            "USER_DISABLED" => Self::UserDisabled,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::TooManyRequests,
            "FEDERATED_USER_ID_ALREADY_LINKED" => Self::CredentialAlreadyLinked,
            "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" | "USER_NOT_FOUND" => Self::SessionExpired,
            "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => Self::RequiresRecentLogin,
            _ => Self::Api {
                code,
                message: message.to_owned(),
            },
        }
    }
}

/// The auth provider seam.
///
/// Everything the platform needs from the managed identity service. Session
/// tokens are the provider's short-lived bearer tokens; all mutating
/// operations act on the identity that token belongs to.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Register a new identity with email and password.
    async fn sign_up_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<AuthSession, IdentityError>;

    /// Sign in with email and password.
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<AuthSession, IdentityError>;

    /// Sign in with a Google id token.
    ///
    /// Returns [`FederatedSignIn::NeedsConfirmation`] when an account
    /// already exists under the same email with different credentials.
    async fn sign_in_with_google(
        &self,
        google_id_token: &str,
    ) -> Result<FederatedSignIn, IdentityError>;

    /// The sign-in methods already registered for an email.
    async fn fetch_sign_in_methods(
        &self,
        email: &Email,
    ) -> Result<Vec<SignInMethod>, IdentityError>;

    /// Attach a password credential to the session's identity.
    ///
    /// Returns the post-link provider list.
    async fn link_password(
        &self,
        session_token: &str,
        email: &Email,
        password: &str,
    ) -> Result<Vec<SignInMethod>, IdentityError>;

    /// Attach a Google credential to the session's identity.
    ///
    /// Returns the post-link provider list.
    async fn link_google(
        &self,
        session_token: &str,
        google_id_token: &str,
    ) -> Result<Vec<SignInMethod>, IdentityError>;

    /// Detach a credential provider from the session's identity.
    ///
    /// Returns the post-unlink provider list. The caller is responsible for
    /// the last-method guard; the provider would happily strand the account.
    async fn unlink_provider(
        &self,
        session_token: &str,
        method: SignInMethod,
    ) -> Result<Vec<SignInMethod>, IdentityError>;

    /// Look up the session's account, including the live provider list.
    async fn lookup(&self, session_token: &str) -> Result<AccountInfo, IdentityError>;

    /// Permanently delete the session's identity.
    async fn delete_account(&self, session_token: &str) -> Result<(), IdentityError>;
}

/// Configuration for the identity provider client.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct IdentityConfig {
    /// Web API key for the identity service.
    pub api_key: SecretString,
    /// Public base URL of the platform, used as the OAuth request URI.
    pub request_uri: String,
    /// Endpoint override for the local emulator; `None` means production.
    pub endpoint: Option<String>,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("api_key", &"[REDACTED]")
            .field("request_uri", &self.request_uri)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// HTTP client for the managed identity service.
#[derive(Clone)]
pub struct IdentityClient {
    inner: Arc<IdentityClientInner>,
}

struct IdentityClientInner {
    client: reqwest::Client,
    accounts_url: String,
    api_key: String,
    request_uri: String,
}

impl IdentityClient {
    /// Create a new identity client.
    #[must_use]
    pub fn new(config: &IdentityConfig) -> Self {
        let endpoint = config
            .endpoint
            .as_deref()
            .unwrap_or("https://identitytoolkit.googleapis.com");

        Self {
            inner: Arc::new(IdentityClientInner {
                client: reqwest::Client::new(),
                accounts_url: format!("{endpoint}/v1/accounts"),
                api_key: config.api_key.expose_secret().to_owned(),
                request_uri: config.request_uri.clone(),
            }),
        }
    }

    /// POST to `accounts:{op}` and parse the response or error envelope.
    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        op: &str,
        body: serde_json::Value,
    ) -> Result<T, IdentityError> {
        let url = format!("{}:{op}?key={}", self.inner.accounts_url, self.inner.api_key);

        let response = self.inner.client.post(&url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let envelope: Result<IdentityErrorEnvelope, _> = serde_json::from_str(&text);
            return Err(envelope.map_or_else(
                |_| IdentityError::Api {
                    code: status.as_u16(),
                    message: text.chars().take(200).collect(),
                },
                |e| IdentityError::from_code(e.error.code, &e.error.message),
            ));
        }

        Ok(serde_json::from_str(&text)?)
    }

    fn session_from_password_response(
        response: PasswordAuthResponse,
        providers: Vec<SignInMethod>,
        email_verified: bool,
    ) -> Result<AuthSession, IdentityError> {
        let email = Email::parse(&response.email).map_err(|e| {
            IdentityError::MalformedResponse(format!("invalid email from provider: {e}"))
        })?;

        Ok(AuthSession {
            uid: Uid::new(response.local_id),
            email,
            display_name: response.display_name,
            email_verified,
            id_token: response.id_token,
            refresh_token: response.refresh_token,
            providers,
        })
    }
}

#[async_trait]
impl AuthProvider for IdentityClient {
    async fn sign_up_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<AuthSession, IdentityError> {
        let response: PasswordAuthResponse = self
            .call(
                "signUp",
                json!({
                    "email": email.as_str(),
                    "password": password,
                    "returnSecureToken": true,
                }),
            )
            .await?;

        Self::session_from_password_response(response, vec![SignInMethod::Password], false)
    }

    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<AuthSession, IdentityError> {
        let response: PasswordAuthResponse = self
            .call(
                "signInWithPassword",
                json!({
                    "email": email.as_str(),
                    "password": password,
                    "returnSecureToken": true,
                }),
            )
            .await?;

        // The password response does not carry the provider list; fetch the
        // live list so the session starts accurate.
        let mut session =
            Self::session_from_password_response(response, vec![SignInMethod::Password], false)?;
        let info = self.lookup(&session.id_token).await?;
        session.providers = info.providers;
        session.email_verified = info.email_verified;
        Ok(session)
    }

    async fn sign_in_with_google(
        &self,
        google_id_token: &str,
    ) -> Result<FederatedSignIn, IdentityError> {
        let response: IdpAuthResponse = self
            .call(
                "signInWithIdp",
                json!({
                    "postBody": format!(
                        "id_token={}&providerId=google.com",
                        urlencoded(google_id_token)
                    ),
                    "requestUri": self.inner.request_uri,
                    "returnSecureToken": true,
                    "returnIdpCredential": true,
                }),
            )
            .await?;

        if response.need_confirmation {
            let email_str = response.email.ok_or_else(|| {
                IdentityError::MalformedResponse(
                    "confirmation-needed response without email".to_owned(),
                )
            })?;
            let email = Email::parse(&email_str).map_err(|e| {
                IdentityError::MalformedResponse(format!("invalid email from provider: {e}"))
            })?;

            return Ok(FederatedSignIn::NeedsConfirmation {
                existing_methods: parse_methods(
                    response.verified_provider.iter().map(String::as_str),
                ),
                email,
            });
        }

        let (Some(local_id), Some(email_str), Some(id_token)) =
            (response.local_id, response.email, response.id_token)
        else {
            return Err(IdentityError::MalformedResponse(
                "federated sign-in response missing identity fields".to_owned(),
            ));
        };
        let email = Email::parse(&email_str).map_err(|e| {
            IdentityError::MalformedResponse(format!("invalid email from provider: {e}"))
        })?;

        let session = AuthSession {
            uid: Uid::new(local_id),
            email,
            display_name: response.display_name,
            email_verified: response.email_verified,
            id_token,
            refresh_token: response.refresh_token,
            providers: vec![SignInMethod::Google],
        };

        // Fetch the live provider list; the identity may also have a
        // password credential from an earlier link.
        let info = self.lookup(&session.id_token).await?;
        let mut session = session;
        session.providers = info.providers;
        Ok(FederatedSignIn::SignedIn(session))
    }

    async fn fetch_sign_in_methods(
        &self,
        email: &Email,
    ) -> Result<Vec<SignInMethod>, IdentityError> {
        let response: AuthUriResponse = self
            .call(
                "createAuthUri",
                json!({
                    "identifier": email.as_str(),
                    "continueUri": self.inner.request_uri,
                }),
            )
            .await?;

        Ok(parse_methods(
            response.signin_methods.iter().map(String::as_str),
        ))
    }

    async fn link_password(
        &self,
        session_token: &str,
        email: &Email,
        password: &str,
    ) -> Result<Vec<SignInMethod>, IdentityError> {
        let response: UpdateAccountResponse = self
            .call(
                "update",
                json!({
                    "idToken": session_token,
                    "email": email.as_str(),
                    "password": password,
                    "returnSecureToken": true,
                }),
            )
            .await?;

        Ok(parse_methods(
            response
                .provider_user_info
                .iter()
                .map(|p| p.provider_id.as_str()),
        ))
    }

    async fn link_google(
        &self,
        session_token: &str,
        google_id_token: &str,
    ) -> Result<Vec<SignInMethod>, IdentityError> {
        let response: IdpAuthResponse = self
            .call(
                "signInWithIdp",
                json!({
                    "idToken": session_token,
                    "postBody": format!(
                        "id_token={}&providerId=google.com",
                        urlencoded(google_id_token)
                    ),
                    "requestUri": self.inner.request_uri,
                    "returnSecureToken": true,
                    "returnIdpCredential": true,
                }),
            )
            .await?;

        let token = response.id_token.ok_or_else(|| {
            IdentityError::MalformedResponse("link response missing session token".to_owned())
        })?;

        let info = self.lookup(&token).await?;
        Ok(info.providers)
    }

    async fn unlink_provider(
        &self,
        session_token: &str,
        method: SignInMethod,
    ) -> Result<Vec<SignInMethod>, IdentityError> {
        let response: UpdateAccountResponse = self
            .call(
                "update",
                json!({
                    "idToken": session_token,
                    "deleteProvider": [method.provider_id()],
                }),
            )
            .await?;

        Ok(parse_methods(
            response
                .provider_user_info
                .iter()
                .map(|p| p.provider_id.as_str()),
        ))
    }

    async fn lookup(&self, session_token: &str) -> Result<AccountInfo, IdentityError> {
        let response: LookupResponse = self
            .call("lookup", json!({"idToken": session_token}))
            .await?;

        let user = response
            .users
            .into_iter()
            .next()
            .ok_or(IdentityError::SessionExpired)?;

        let email_str = user.email.ok_or_else(|| {
            IdentityError::MalformedResponse("account lookup without email".to_owned())
        })?;
        let email = Email::parse(&email_str).map_err(|e| {
            IdentityError::MalformedResponse(format!("invalid email from provider: {e}"))
        })?;

        Ok(AccountInfo {
            uid: Uid::new(user.local_id),
            email,
            email_verified: user.email_verified,
            providers: parse_methods(
                user.provider_user_info
                    .iter()
                    .map(|p| p.provider_id.as_str()),
            ),
        })
    }

    async fn delete_account(&self, session_token: &str) -> Result<(), IdentityError> {
        let _: serde_json::Value = self
            .call("delete", json!({"idToken": session_token}))
            .await?;
        Ok(())
    }
}

/// Percent-encode a token for use inside a form-encoded `postBody`.
fn urlencoded(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        assert!(matches!(
            IdentityError::from_code(400, "EMAIL_EXISTS"),
            IdentityError::EmailExists
        ));
        assert!(matches!(
            IdentityError::from_code(400, "INVALID_PASSWORD"),
            IdentityError::InvalidCredentials
        ));
        assert!(matches!(
            IdentityError::from_code(400, "TOO_MANY_ATTEMPTS_TRY_LATER : try later"),
            IdentityError::TooManyRequests
        ));
        assert!(matches!(
            IdentityError::from_code(400, "FEDERATED_USER_ID_ALREADY_LINKED"),
            IdentityError::CredentialAlreadyLinked
        ));
        assert!(matches!(
            IdentityError::from_code(400, "SOMETHING_ELSE"),
            IdentityError::Api { .. }
        ));
    }

    #[test]
    fn test_urlencoded_escapes_token_separators() {
        assert_eq!(urlencoded("abc-123"), "abc-123");
        assert_eq!(urlencoded("a+b=c"), "a%2Bb%3Dc");
    }
}
