//! Authentication service.
//!
//! Registration, password and federated (Google) sign-in, the credential
//! linking flow, and unlink with the last-method guard. Wraps the injected
//! [`AuthProvider`] plus the profile repository; route handlers only ever
//! talk to this service.

mod context;
mod error;
mod linking;

pub use context::{AuthSnapshot, ProfileFetcher, SessionTracker};
pub use error::AuthError;
pub use linking::{LinkConflict, LinkCredential, LinkOutcome, LinkingFlow, guard_unlink, unlink};

use hackdeck_core::{Email, SignInMethod, Uid};
use hackdeck_store::db::users::UserRepository;
use hackdeck_store::firestore::FirestoreClient;
use hackdeck_store::identity::{AuthProvider, AuthSession, FederatedSignIn};
use hackdeck_store::models::UserProfile;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Outcome of a registration attempt.
pub enum RegisterOutcome {
    /// Identity created and profile stored.
    Registered {
        session: AuthSession,
        profile: Box<UserProfile>,
    },
    /// The email is registered under a different method; the linking flow
    /// has been started and the confirmation prompt should be surfaced.
    ConflictDetected(LinkConflict),
}

/// Outcome of a federated sign-in attempt.
pub enum FederatedOutcome {
    /// Signed in; profile fetched (or created on first federated sign-in).
    SignedIn {
        session: AuthSession,
        profile: Box<UserProfile>,
    },
    /// The email is registered under a different method; the linking flow
    /// has been started and the confirmation prompt should be surfaced.
    ConflictDetected(LinkConflict),
}

/// Authentication service.
pub struct AuthService<'a> {
    provider: &'a dyn AuthProvider,
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(provider: &'a dyn AuthProvider, store: &'a FirestoreClient) -> Self {
        Self {
            provider,
            users: UserRepository::new(store),
        }
    }

    // =========================================================================
    // Registration & sign-in
    // =========================================================================

    /// Register a new user with email and password.
    ///
    /// On "email already in use" with a *different* existing method, the
    /// supplied linking flow moves to awaiting-confirmation and the conflict
    /// is returned instead of an error.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail`/`WeakPassword` on validation
    /// failure, `UserAlreadyExists` when the email is taken by the same
    /// method, or a provider/repository error.
    pub async fn register(
        &self,
        flow: &mut LinkingFlow,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<RegisterOutcome, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        match self.provider.sign_up_with_password(&email, password).await {
            Ok(session) => {
                let profile = self.ensure_profile(&session, display_name).await?;
                Ok(RegisterOutcome::Registered {
                    session,
                    profile: Box::new(profile),
                })
            }
            Err(hackdeck_store::identity::IdentityError::EmailExists) => {
                match flow
                    .detect(self.provider, &email, SignInMethod::Password)
                    .await?
                {
                    Some(_) => {
                        let conflict = flow.await_confirmation()?;
                        Ok(RegisterOutcome::ConflictDetected(conflict))
                    }
                    // Registered with password already - a plain duplicate.
                    None => Err(AuthError::UserAlreadyExists),
                }
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Sign in with email and password.
    ///
    /// A session whose stored profile cannot be fetched resolves to *not
    /// authenticated* (`ProfileUnavailable`), never to a session with a
    /// missing profile.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` on a bad email/password, or
    /// `ProfileUnavailable` when the profile is absent or unreadable.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(AuthSession, UserProfile), AuthError> {
        let email = Email::parse(email)?;
        let session = self.provider.sign_in_with_password(&email, password).await?;

        match self.users.get(&session.uid).await {
            Ok(Some(profile)) => Ok((session, profile)),
            Ok(None) => {
                tracing::warn!(uid = %session.uid, "signed in but profile missing");
                Err(AuthError::ProfileUnavailable)
            }
            Err(err) => {
                tracing::warn!(uid = %session.uid, error = %err, "profile fetch failed after sign-in");
                Err(AuthError::ProfileUnavailable)
            }
        }
    }

    /// Sign in with a Google id token.
    ///
    /// First federated sign-in creates the profile. A conflict with an
    /// existing differently-credentialed account starts the linking flow.
    ///
    /// # Errors
    ///
    /// Returns provider errors, or `ProfileUnavailable` when the profile
    /// can neither be fetched nor created.
    pub async fn sign_in_with_google(
        &self,
        flow: &mut LinkingFlow,
        google_id_token: &str,
    ) -> Result<FederatedOutcome, AuthError> {
        match self.provider.sign_in_with_google(google_id_token).await? {
            FederatedSignIn::SignedIn(session) => {
                let profile = self
                    .ensure_profile(&session, session.display_name.as_deref())
                    .await?;
                Ok(FederatedOutcome::SignedIn {
                    session,
                    profile: Box::new(profile),
                })
            }
            FederatedSignIn::NeedsConfirmation {
                email,
                existing_methods,
            } => {
                let detected = flow
                    .detect(self.provider, &email, SignInMethod::Google)
                    .await?;
                if detected.is_none() {
                    // The method query disagreed with the sign-in response;
                    // trust the response's own method list.
                    if existing_methods.is_empty() {
                        return Err(AuthError::LinkFailed);
                    }
                    flow.on_conflict(LinkConflict {
                        email,
                        existing_methods,
                        attempted: SignInMethod::Google,
                    })?;
                }
                let conflict = flow.await_confirmation()?;
                Ok(FederatedOutcome::ConflictDetected(conflict))
            }
        }
    }

    // =========================================================================
    // Credential management
    // =========================================================================

    /// Complete a confirmed linking flow: re-authenticate with the existing
    /// method, attach the new credential, persist the merged method list.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidLinkState` outside awaiting-confirmation,
    /// or `LinkFailed` when any step fails.
    pub async fn confirm_link(
        &self,
        flow: &mut LinkingFlow,
        existing: LinkCredential,
        new: LinkCredential,
    ) -> Result<LinkOutcome, AuthError> {
        let users = &self.users;
        flow.confirm(self.provider, existing, new, |uid, methods| async move {
            users.set_linked_methods(&uid, &methods).await
        })
        .await
    }

    /// Detach a sign-in method, enforcing the last-method guard against the
    /// session's local provider list before any network call.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::LastMethod`/`MethodNotLinked` from the local
    /// guard, or a provider error from the unlink itself.
    pub async fn unlink(
        &self,
        uid: &Uid,
        current_methods: &[SignInMethod],
        session_token: &str,
        method: SignInMethod,
    ) -> Result<Vec<SignInMethod>, AuthError> {
        let users = &self.users;
        unlink(
            self.provider,
            current_methods,
            session_token,
            method,
            |methods| async move { users.set_linked_methods(uid, &methods).await },
        )
        .await
    }

    /// The live linked-method list for a session.
    ///
    /// Read from the provider at render time, not from the cached profile
    /// field - the two can diverge after a link/unlink that failed to
    /// persist.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionExpired` for a dead token.
    pub async fn linked_accounts(
        &self,
        session_token: &str,
    ) -> Result<Vec<SignInMethod>, AuthError> {
        Ok(self.provider.lookup(session_token).await?.providers)
    }

    /// Permanently delete the session's identity at the provider.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionExpired` for a dead token.
    pub async fn delete_identity(&self, session_token: &str) -> Result<(), AuthError> {
        self.provider.delete_account(session_token).await?;
        Ok(())
    }

    /// Fetch the profile, creating it when absent (first sign-in for a
    /// federated identity, or a registration whose create raced another
    /// request).
    async fn ensure_profile(
        &self,
        session: &AuthSession,
        display_name: Option<&str>,
    ) -> Result<UserProfile, AuthError> {
        if let Some(profile) = self.users.get(&session.uid).await? {
            return Ok(profile);
        }

        match self
            .users
            .create_initial(&session.uid, &session.email, display_name, &session.providers)
            .await
        {
            Ok(profile) => Ok(profile),
            Err(hackdeck_store::db::RepositoryError::Conflict(_)) => self
                .users
                .get(&session.uid)
                .await?
                .ok_or(AuthError::ProfileUnavailable),
            Err(err) => {
                tracing::warn!(uid = %session.uid, error = %err, "profile creation failed");
                Err(AuthError::ProfileUnavailable)
            }
        }
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough password").is_ok());
    }
}
