//! Wire and domain types for the identity provider.

use hackdeck_core::{Email, SignInMethod, Uid};
use serde::{Deserialize, Serialize};

// =============================================================================
// Domain types
// =============================================================================

/// An authenticated session as reported by the identity provider.
///
/// Ephemeral: created on successful sign-in, destroyed on sign-out or token
/// expiry, never persisted beyond the provider's own token mechanism.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// The identity's unique id.
    pub uid: Uid,
    /// Provider-reported email.
    pub email: Email,
    /// Provider-reported display name, if any.
    pub display_name: Option<String>,
    /// Whether the provider considers the email verified.
    pub email_verified: bool,
    /// Short-lived bearer token for provider calls on behalf of this session.
    pub id_token: String,
    /// Long-lived token for refreshing `id_token`.
    pub refresh_token: Option<String>,
    /// Credential providers currently linked to this identity.
    pub providers: Vec<SignInMethod>,
}

/// Outcome of a federated sign-in attempt.
#[derive(Debug, Clone)]
pub enum FederatedSignIn {
    /// Signed in (new or existing account under this provider).
    SignedIn(AuthSession),
    /// An account already exists under this email with different
    /// credentials; the caller must run the linking flow.
    NeedsConfirmation {
        email: Email,
        /// Methods already registered for the email.
        existing_methods: Vec<SignInMethod>,
    },
}

/// Account state from a session lookup: the live provider list plus basic
/// identity fields.
#[derive(Debug, Clone)]
pub struct AccountInfo {
    pub uid: Uid,
    pub email: Email,
    pub email_verified: bool,
    /// The live set of linked credential providers. This, not the cached
    /// profile field, is what the UI shows.
    pub providers: Vec<SignInMethod>,
}

// =============================================================================
// Wire types
// =============================================================================

/// Response to `accounts:signUp` and `accounts:signInWithPassword`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordAuthResponse {
    pub local_id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Response to `accounts:signInWithIdp`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdpAuthResponse {
    #[serde(default)]
    pub local_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Set when an account already exists under this email with different
    /// credentials; the sign-in has NOT completed.
    #[serde(default)]
    pub need_confirmation: bool,
    /// Providers already registered for the email when `need_confirmation`.
    #[serde(default)]
    pub verified_provider: Vec<String>,
}

/// Response to `accounts:createAuthUri` (sign-in methods for an email).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUriResponse {
    #[serde(default)]
    pub registered: bool,
    #[serde(default)]
    pub signin_methods: Vec<String>,
}

/// Response to `accounts:lookup`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResponse {
    #[serde(default)]
    pub users: Vec<LookupUser>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupUser {
    pub local_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub provider_user_info: Vec<ProviderUserInfo>,
}

/// One linked credential provider on an account.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderUserInfo {
    pub provider_id: String,
    #[serde(default)]
    pub federated_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Response to `accounts:update` (link/unlink).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountResponse {
    pub local_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub provider_user_info: Vec<ProviderUserInfo>,
}

/// Error envelope returned by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityErrorEnvelope {
    pub error: IdentityErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityErrorBody {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
}

/// Parse a wire provider list, skipping identifiers this platform does not
/// use (e.g. the provider's internal phone entry).
#[must_use]
pub fn parse_methods<'a, I>(provider_ids: I) -> Vec<SignInMethod>
where
    I: IntoIterator<Item = &'a str>,
{
    provider_ids
        .into_iter()
        .filter_map(|id| SignInMethod::parse(id).ok())
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_methods_skips_unknown() {
        let methods = parse_methods(["password", "phone", "google.com"]);
        assert_eq!(methods, vec![SignInMethod::Password, SignInMethod::Google]);
    }

    #[test]
    fn test_idp_response_need_confirmation() {
        let resp: IdpAuthResponse = serde_json::from_value(serde_json::json!({
            "needConfirmation": true,
            "email": "a@x.com",
            "verifiedProvider": ["password"]
        }))
        .unwrap();

        assert!(resp.need_confirmation);
        assert_eq!(resp.verified_provider, vec!["password"]);
        assert!(resp.id_token.is_none());
    }

    #[test]
    fn test_lookup_response_providers() {
        let resp: LookupResponse = serde_json::from_value(serde_json::json!({
            "users": [{
                "localId": "u1",
                "email": "a@x.com",
                "providerUserInfo": [
                    {"providerId": "password"},
                    {"providerId": "google.com", "federatedId": "g-123"}
                ]
            }]
        }))
        .unwrap();

        let user = resp.users.first().unwrap();
        assert_eq!(user.local_id, "u1");
        assert_eq!(user.provider_user_info.len(), 2);
    }
}
