//! Authentication error types.

use thiserror::Error;

use hackdeck_store::db::RepositoryError;
use hackdeck_store::identity::IdentityError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] hackdeck_core::EmailError),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Wrong email/password combination.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The email is already registered with the same method.
    #[error("user already exists")]
    UserAlreadyExists,

    /// The account has been disabled.
    #[error("account disabled")]
    AccountDisabled,

    /// The provider is throttling sign-in attempts.
    #[error("too many attempts")]
    TooManyRequests,

    /// The session token is expired or invalid.
    #[error("session expired")]
    SessionExpired,

    /// The federated credential already belongs to a different account.
    #[error("credential already linked to another account")]
    CredentialAlreadyLinked,

    /// A session exists but its profile could not be fetched or is absent.
    /// Treated as not authenticated, never as a partial session.
    #[error("profile unavailable for authenticated session")]
    ProfileUnavailable,

    /// Unlinking the sole remaining sign-in method is not allowed.
    #[error("cannot remove the last sign-in method")]
    LastMethod,

    /// The method to unlink is not on the account.
    #[error("sign-in method not linked")]
    MethodNotLinked,

    /// A linking step was invoked outside the expected flow state.
    #[error("invalid linking state")]
    InvalidLinkState,

    /// A linking step failed; the linked-method list was not partially
    /// updated. The user gets a generic retry message.
    #[error("linking failed")]
    LinkFailed,

    /// Other identity provider error.
    #[error("identity provider error: {0}")]
    Identity(IdentityError),

    /// Repository error.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<IdentityError> for AuthError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::EmailExists => Self::UserAlreadyExists,
            IdentityError::InvalidCredentials => Self::InvalidCredentials,
            IdentityError::UserDisabled => Self::AccountDisabled,
            IdentityError::TooManyRequests => Self::TooManyRequests,
            IdentityError::SessionExpired | IdentityError::RequiresRecentLogin => {
                Self::SessionExpired
            }
            IdentityError::CredentialAlreadyLinked => Self::CredentialAlreadyLinked,
            other => Self::Identity(other),
        }
    }
}
