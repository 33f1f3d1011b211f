//! Credential linking flow.
//!
//! Resolves the case where a user attempts to register or sign in with one
//! credential provider while an account already exists under a different
//! provider for the same email address.
//!
//! States:
//!
//! ```text
//! idle -> method-conflict-detected -> awaiting-user-confirmation
//!      -> linking-in-progress -> linked            (terminal success)
//!                             -> linking-failed    (terminal, reset to idle)
//! ```
//!
//! The flow is serialized into the cookie session between requests, so each
//! HTTP round trip resumes it where the previous one left off. Any step
//! failure (wrong password during re-auth, closed popup, network error)
//! lands in `linking-failed` with a generic retry message; the stored
//! linked-method list is written exactly once, after the attach succeeds -
//! never partially.

use serde::{Deserialize, Serialize};

use hackdeck_core::{Email, SignInMethod, Uid};
use hackdeck_store::db::RepositoryError;
use hackdeck_store::identity::{AuthProvider, AuthSession, FederatedSignIn};

use super::error::AuthError;

/// A detected cross-method conflict, surfaced to the user for confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConflict {
    pub email: Email,
    /// Methods already registered for this email.
    pub existing_methods: Vec<SignInMethod>,
    /// The method the user just attempted.
    pub attempted: SignInMethod,
}

impl LinkConflict {
    /// User-facing confirmation prompt naming both methods.
    #[must_use]
    pub fn prompt(&self) -> String {
        let existing = self
            .existing_methods
            .iter()
            .map(|m| m.display_name())
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "This email is registered with {existing}. Link {} to the same account?",
            self.attempted.display_name()
        )
    }
}

/// Credential material for one sign-in method.
#[derive(Debug, Clone)]
pub enum LinkCredential {
    Password { email: Email, password: String },
    Google { id_token: String },
}

impl LinkCredential {
    /// The method this credential authenticates.
    #[must_use]
    pub const fn method(&self) -> SignInMethod {
        match self {
            Self::Password { .. } => SignInMethod::Password,
            Self::Google { .. } => SignInMethod::Google,
        }
    }
}

/// Result of a completed link.
#[derive(Debug, Clone)]
pub struct LinkOutcome {
    /// Re-authenticated session, provider list already updated.
    pub session: AuthSession,
    /// The post-link method set: the union of pre-existing and newly linked
    /// methods.
    pub methods: Vec<SignInMethod>,
}

/// The linking flow state machine.
///
/// Serialized into the session between requests; `Idle` is the default for
/// sessions with no flow in progress.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum LinkingFlow {
    #[default]
    Idle,
    MethodConflictDetected { conflict: LinkConflict },
    AwaitingConfirmation { conflict: LinkConflict },
    LinkingInProgress { conflict: LinkConflict },
    Linked { methods: Vec<SignInMethod> },
    Failed,
}

impl LinkingFlow {
    /// A fresh flow in `Idle`.
    #[must_use]
    pub const fn new() -> Self {
        Self::Idle
    }

    /// After a registration or federated sign-in failure, query the methods
    /// registered for the email and detect a cross-method conflict.
    ///
    /// Returns `None` (and stays `Idle`) when there is no conflict: the
    /// email is unregistered, or it is registered with the attempted method
    /// itself.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidLinkState` when not `Idle`, or a provider
    /// error from the method query.
    pub async fn detect(
        &mut self,
        provider: &dyn AuthProvider,
        email: &Email,
        attempted: SignInMethod,
    ) -> Result<Option<LinkConflict>, AuthError> {
        if !matches!(self, Self::Idle) {
            return Err(AuthError::InvalidLinkState);
        }

        let existing_methods = provider.fetch_sign_in_methods(email).await?;
        if existing_methods.is_empty() || existing_methods.contains(&attempted) {
            return Ok(None);
        }

        let conflict = LinkConflict {
            email: email.clone(),
            existing_methods,
            attempted,
        };
        *self = Self::MethodConflictDetected {
            conflict: conflict.clone(),
        };
        Ok(Some(conflict))
    }

    /// Enter the conflict state with a provider-reported method list,
    /// skipping the query (the federated sign-in response already carries
    /// it).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidLinkState` when not `Idle`.
    pub fn on_conflict(&mut self, conflict: LinkConflict) -> Result<(), AuthError> {
        if !matches!(self, Self::Idle) {
            return Err(AuthError::InvalidLinkState);
        }
        *self = Self::MethodConflictDetected { conflict };
        Ok(())
    }

    /// The confirmation prompt has been surfaced to the user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidLinkState` when no conflict was detected.
    pub fn await_confirmation(&mut self) -> Result<LinkConflict, AuthError> {
        match self {
            Self::MethodConflictDetected { conflict } => {
                let conflict = conflict.clone();
                *self = Self::AwaitingConfirmation {
                    conflict: conflict.clone(),
                };
                Ok(conflict)
            }
            _ => Err(AuthError::InvalidLinkState),
        }
    }

    /// The user confirmed: re-authenticate with the pre-existing method,
    /// attach the new credential to the same identity, then persist the
    /// updated method list through `persist`.
    ///
    /// On success the flow is `Linked`. On any step failure the flow is
    /// `Failed` and the error is the generic [`AuthError::LinkFailed`]; the
    /// stored list is never partially updated.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidLinkState` when not awaiting confirmation
    /// or when the supplied credentials don't match the detected conflict;
    /// `AuthError::LinkFailed` for any failed step.
    pub async fn confirm<F, Fut>(
        &mut self,
        provider: &dyn AuthProvider,
        existing: LinkCredential,
        new: LinkCredential,
        persist: F,
    ) -> Result<LinkOutcome, AuthError>
    where
        F: FnOnce(Uid, Vec<SignInMethod>) -> Fut,
        Fut: Future<Output = Result<(), RepositoryError>>,
    {
        let conflict = match self {
            Self::AwaitingConfirmation { conflict } => conflict.clone(),
            _ => return Err(AuthError::InvalidLinkState),
        };

        if !conflict.existing_methods.contains(&existing.method())
            || new.method() != conflict.attempted
        {
            return Err(AuthError::InvalidLinkState);
        }

        *self = Self::LinkingInProgress {
            conflict: conflict.clone(),
        };

        match run_link(provider, existing, new, persist).await {
            Ok(outcome) => {
                *self = Self::Linked {
                    methods: outcome.methods.clone(),
                };
                Ok(outcome)
            }
            Err(err) => {
                tracing::warn!(
                    email = %conflict.email,
                    attempted = %conflict.attempted,
                    error = %err,
                    "credential linking failed"
                );
                *self = Self::Failed;
                Err(AuthError::LinkFailed)
            }
        }
    }

    /// Return a terminal flow to `Idle`.
    pub fn reset(&mut self) {
        *self = Self::Idle;
    }

    /// The conflict in flight, if any.
    #[must_use]
    pub const fn conflict(&self) -> Option<&LinkConflict> {
        match self {
            Self::MethodConflictDetected { conflict }
            | Self::AwaitingConfirmation { conflict }
            | Self::LinkingInProgress { conflict } => Some(conflict),
            _ => None,
        }
    }
}

/// Re-auth + attach + persist. Any error here becomes `linking-failed`.
async fn run_link<F, Fut>(
    provider: &dyn AuthProvider,
    existing: LinkCredential,
    new: LinkCredential,
    persist: F,
) -> Result<LinkOutcome, AuthError>
where
    F: FnOnce(Uid, Vec<SignInMethod>) -> Fut,
    Fut: Future<Output = Result<(), RepositoryError>>,
{
    // Re-authenticate with the pre-existing method.
    let session = match existing {
        LinkCredential::Password { email, password } => {
            provider.sign_in_with_password(&email, &password).await?
        }
        LinkCredential::Google { id_token } => {
            match provider.sign_in_with_google(&id_token).await? {
                FederatedSignIn::SignedIn(session) => session,
                FederatedSignIn::NeedsConfirmation { .. } => {
                    return Err(AuthError::InvalidCredentials);
                }
            }
        }
    };
    let before = session.providers.clone();

    // Attach the new credential to the same identity.
    let methods = match new {
        LinkCredential::Password { email, password } => {
            provider
                .link_password(&session.id_token, &email, &password)
                .await?
        }
        LinkCredential::Google { id_token } => {
            provider.link_google(&session.id_token, &id_token).await?
        }
    };

    // The post-link set must be a superset of the pre-existing one; a
    // provider response that lost a method must not be persisted.
    if !before.iter().all(|m| methods.contains(m)) {
        return Err(AuthError::LinkFailed);
    }

    persist(session.uid.clone(), methods.clone()).await?;

    let mut session = session;
    session.providers = methods.clone();
    Ok(LinkOutcome { session, methods })
}

/// Local unlink guard: at least one method must remain after any unlink, so
/// removal is only permitted with two or more currently linked. Checked
/// against the session's local provider list - no network call involved.
///
/// # Errors
///
/// Returns `AuthError::LastMethod` when at most one method is linked, or
/// `MethodNotLinked` when the method isn't on the list.
pub fn guard_unlink(current: &[SignInMethod], method: SignInMethod) -> Result<(), AuthError> {
    if current.len() < 2 {
        return Err(AuthError::LastMethod);
    }
    if !current.contains(&method) {
        return Err(AuthError::MethodNotLinked);
    }
    Ok(())
}

/// Detach a sign-in method after the local guard passes, then persist the
/// remaining list.
///
/// A failed persist is logged and tolerated: the cached profile list may now
/// lag the provider, which is why displays read the live session list.
///
/// # Errors
///
/// Returns the guard errors from [`guard_unlink`] or a provider error from
/// the unlink call.
pub async fn unlink<F, Fut>(
    provider: &dyn AuthProvider,
    current: &[SignInMethod],
    session_token: &str,
    method: SignInMethod,
    persist: F,
) -> Result<Vec<SignInMethod>, AuthError>
where
    F: FnOnce(Vec<SignInMethod>) -> Fut,
    Fut: Future<Output = Result<(), RepositoryError>>,
{
    guard_unlink(current, method)?;

    let remaining = provider.unlink_provider(session_token, method).await?;
    if let Err(err) = persist(remaining.clone()).await {
        tracing::warn!(error = %err, "failed to persist linked methods after unlink");
    }
    Ok(remaining)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use hackdeck_store::identity::{AccountInfo, IdentityError};

    // =========================================================================
    // Fake provider
    // =========================================================================

    #[derive(Clone)]
    struct FakeAccount {
        uid: String,
        password: Option<String>,
        methods: Vec<SignInMethod>,
    }

    /// In-memory auth provider. Session tokens are `tok:{email}`, Google id
    /// tokens are `gtok:{email}`.
    struct FakeProvider {
        accounts: Mutex<HashMap<String, FakeAccount>>,
        /// Total provider calls, for asserting "no network call" paths.
        calls: AtomicUsize,
        /// When set, link responses drop the pre-existing methods,
        /// simulating a provider response that silently lost one.
        lossy_link: AtomicBool,
    }

    impl FakeProvider {
        fn new() -> Self {
            Self {
                accounts: Mutex::new(HashMap::new()),
                calls: AtomicUsize::new(0),
                lossy_link: AtomicBool::new(false),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn token_email(token: &str) -> Result<String, IdentityError> {
            token
                .strip_prefix("tok:")
                .map(str::to_owned)
                .ok_or(IdentityError::SessionExpired)
        }

        fn session_for(email: &str, account: &FakeAccount) -> AuthSession {
            AuthSession {
                uid: Uid::new(&account.uid),
                email: Email::parse(email).unwrap(),
                display_name: None,
                email_verified: true,
                id_token: format!("tok:{email}"),
                refresh_token: None,
                providers: account.methods.clone(),
            }
        }
    }

    #[async_trait]
    impl AuthProvider for FakeProvider {
        async fn sign_up_with_password(
            &self,
            email: &Email,
            password: &str,
        ) -> Result<AuthSession, IdentityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut accounts = self.accounts.lock().unwrap();
            if accounts.contains_key(email.as_str()) {
                return Err(IdentityError::EmailExists);
            }
            let account = FakeAccount {
                uid: format!("uid-{}", email.local_part()),
                password: Some(password.to_owned()),
                methods: vec![SignInMethod::Password],
            };
            accounts.insert(email.as_str().to_owned(), account.clone());
            Ok(Self::session_for(email.as_str(), &account))
        }

        async fn sign_in_with_password(
            &self,
            email: &Email,
            password: &str,
        ) -> Result<AuthSession, IdentityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let accounts = self.accounts.lock().unwrap();
            let account = accounts
                .get(email.as_str())
                .ok_or(IdentityError::InvalidCredentials)?;
            if account.password.as_deref() != Some(password) {
                return Err(IdentityError::InvalidCredentials);
            }
            Ok(Self::session_for(email.as_str(), account))
        }

        async fn sign_in_with_google(
            &self,
            google_id_token: &str,
        ) -> Result<FederatedSignIn, IdentityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let email = google_id_token
                .strip_prefix("gtok:")
                .ok_or(IdentityError::InvalidCredentials)?;
            let email = Email::parse(email).map_err(|_| IdentityError::InvalidCredentials)?;

            let mut accounts = self.accounts.lock().unwrap();
            match accounts.get(email.as_str()) {
                Some(account) if account.methods.contains(&SignInMethod::Google) => Ok(
                    FederatedSignIn::SignedIn(Self::session_for(email.as_str(), account)),
                ),
                Some(account) => Ok(FederatedSignIn::NeedsConfirmation {
                    email: email.clone(),
                    existing_methods: account.methods.clone(),
                }),
                None => {
                    let account = FakeAccount {
                        uid: format!("uid-{}", email.local_part()),
                        password: None,
                        methods: vec![SignInMethod::Google],
                    };
                    accounts.insert(email.as_str().to_owned(), account.clone());
                    Ok(FederatedSignIn::SignedIn(Self::session_for(
                        email.as_str(),
                        &account,
                    )))
                }
            }
        }

        async fn fetch_sign_in_methods(
            &self,
            email: &Email,
        ) -> Result<Vec<SignInMethod>, IdentityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let accounts = self.accounts.lock().unwrap();
            Ok(accounts
                .get(email.as_str())
                .map(|a| a.methods.clone())
                .unwrap_or_default())
        }

        async fn link_password(
            &self,
            session_token: &str,
            _email: &Email,
            password: &str,
        ) -> Result<Vec<SignInMethod>, IdentityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let email = Self::token_email(session_token)?;
            let mut accounts = self.accounts.lock().unwrap();
            let account = accounts
                .get_mut(&email)
                .ok_or(IdentityError::SessionExpired)?;
            account.password = Some(password.to_owned());
            if !account.methods.contains(&SignInMethod::Password) {
                account.methods.push(SignInMethod::Password);
            }
            if self.lossy_link.load(Ordering::SeqCst) {
                return Ok(vec![SignInMethod::Password]);
            }
            Ok(account.methods.clone())
        }

        async fn link_google(
            &self,
            session_token: &str,
            _google_id_token: &str,
        ) -> Result<Vec<SignInMethod>, IdentityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let email = Self::token_email(session_token)?;
            let mut accounts = self.accounts.lock().unwrap();
            let account = accounts
                .get_mut(&email)
                .ok_or(IdentityError::SessionExpired)?;
            if !account.methods.contains(&SignInMethod::Google) {
                account.methods.push(SignInMethod::Google);
            }
            if self.lossy_link.load(Ordering::SeqCst) {
                return Ok(vec![SignInMethod::Google]);
            }
            Ok(account.methods.clone())
        }

        async fn unlink_provider(
            &self,
            session_token: &str,
            method: SignInMethod,
        ) -> Result<Vec<SignInMethod>, IdentityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let email = Self::token_email(session_token)?;
            let mut accounts = self.accounts.lock().unwrap();
            let account = accounts
                .get_mut(&email)
                .ok_or(IdentityError::SessionExpired)?;
            account.methods.retain(|m| *m != method);
            Ok(account.methods.clone())
        }

        async fn lookup(&self, session_token: &str) -> Result<AccountInfo, IdentityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let email = Self::token_email(session_token)?;
            let accounts = self.accounts.lock().unwrap();
            let account = accounts.get(&email).ok_or(IdentityError::SessionExpired)?;
            Ok(AccountInfo {
                uid: Uid::new(&account.uid),
                email: Email::parse(&email).unwrap(),
                email_verified: true,
                providers: account.methods.clone(),
            })
        }

        async fn delete_account(&self, session_token: &str) -> Result<(), IdentityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let email = Self::token_email(session_token)?;
            let mut accounts = self.accounts.lock().unwrap();
            accounts.remove(&email).ok_or(IdentityError::SessionExpired)?;
            Ok(())
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    use std::future::{Ready, ready};
    use std::sync::Arc;

    type PersistResult = Result<(), RepositoryError>;
    type PersistLog = Arc<Mutex<Vec<(Uid, Vec<SignInMethod>)>>>;

    fn recorder() -> PersistLog {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn persist_into(
        log: &PersistLog,
    ) -> impl FnOnce(Uid, Vec<SignInMethod>) -> Ready<PersistResult> {
        let log = Arc::clone(log);
        move |uid, methods| {
            log.lock().unwrap().push((uid, methods));
            ready(Ok(()))
        }
    }

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    async fn seeded_password_provider(addr: &str, password: &str) -> FakeProvider {
        let provider = FakeProvider::new();
        provider
            .sign_up_with_password(&email(addr), password)
            .await
            .unwrap();
        provider
    }

    // =========================================================================
    // Conflict detection
    // =========================================================================

    #[tokio::test]
    async fn test_conflict_detected_names_both_methods() {
        let provider = seeded_password_provider("a@x.com", "hunter2hunter2").await;
        let mut flow = LinkingFlow::new();

        let conflict = flow
            .detect(&provider, &email("a@x.com"), SignInMethod::Google)
            .await
            .unwrap()
            .expect("conflict expected");

        assert_eq!(conflict.existing_methods, vec![SignInMethod::Password]);
        assert_eq!(conflict.attempted, SignInMethod::Google);
        assert!(matches!(flow, LinkingFlow::MethodConflictDetected { .. }));

        let prompt = conflict.prompt();
        assert!(prompt.contains("password"));
        assert!(prompt.contains("Google"));
    }

    #[tokio::test]
    async fn test_no_conflict_for_unregistered_email() {
        let provider = FakeProvider::new();
        let mut flow = LinkingFlow::new();

        let detected = flow
            .detect(&provider, &email("new@x.com"), SignInMethod::Google)
            .await
            .unwrap();

        assert!(detected.is_none());
        assert!(matches!(flow, LinkingFlow::Idle));
    }

    #[tokio::test]
    async fn test_same_method_is_not_a_conflict() {
        let provider = seeded_password_provider("a@x.com", "hunter2hunter2").await;
        let mut flow = LinkingFlow::new();

        let detected = flow
            .detect(&provider, &email("a@x.com"), SignInMethod::Password)
            .await
            .unwrap();

        // A plain duplicate registration, not a cross-method conflict; no
        // second account appears.
        assert!(detected.is_none());
        assert_eq!(provider.accounts.lock().unwrap().len(), 1);
    }

    // =========================================================================
    // The password -> Google linking scenario
    // =========================================================================

    #[tokio::test]
    async fn test_password_then_google_link_scenario() {
        let provider = seeded_password_provider("a@x.com", "hunter2hunter2").await;
        let mut flow = LinkingFlow::new();

        // Google sign-in with the same email reports a conflict.
        let federated = provider.sign_in_with_google("gtok:a@x.com").await.unwrap();
        assert!(matches!(
            federated,
            FederatedSignIn::NeedsConfirmation { .. }
        ));

        // The flow detects it and surfaces the prompt.
        flow.detect(&provider, &email("a@x.com"), SignInMethod::Google)
            .await
            .unwrap()
            .expect("conflict expected");
        flow.await_confirmation().unwrap();

        // User confirms: re-auth with password, attach Google.
        let log = recorder();
        let outcome = flow
            .confirm(
                &provider,
                LinkCredential::Password {
                    email: email("a@x.com"),
                    password: "hunter2hunter2".to_owned(),
                },
                LinkCredential::Google {
                    id_token: "gtok:a@x.com".to_owned(),
                },
                persist_into(&log),
            )
            .await
            .unwrap();

        // Post-condition: the union of both methods, persisted and live.
        assert_eq!(
            outcome.methods,
            vec![SignInMethod::Password, SignInMethod::Google]
        );
        assert!(matches!(flow, LinkingFlow::Linked { .. }));

        let persisted = log.lock().unwrap();
        assert_eq!(persisted.len(), 1);
        assert_eq!(
            persisted.first().unwrap().1,
            vec![SignInMethod::Password, SignInMethod::Google]
        );

        let live = provider.lookup("tok:a@x.com").await.unwrap().providers;
        assert_eq!(live, vec![SignInMethod::Password, SignInMethod::Google]);
    }

    #[tokio::test]
    async fn test_wrong_password_during_reauth_fails_generically() {
        let provider = seeded_password_provider("a@x.com", "hunter2hunter2").await;
        let mut flow = LinkingFlow::new();

        flow.detect(&provider, &email("a@x.com"), SignInMethod::Google)
            .await
            .unwrap();
        flow.await_confirmation().unwrap();

        let log = recorder();
        let result = flow
            .confirm(
                &provider,
                LinkCredential::Password {
                    email: email("a@x.com"),
                    password: "wrong-password".to_owned(),
                },
                LinkCredential::Google {
                    id_token: "gtok:a@x.com".to_owned(),
                },
                persist_into(&log),
            )
            .await;

        // Generic failure, terminal state, nothing persisted.
        assert!(matches!(result, Err(AuthError::LinkFailed)));
        assert!(matches!(flow, LinkingFlow::Failed));
        assert!(log.lock().unwrap().is_empty());

        // Failed returns to idle.
        flow.reset();
        assert!(matches!(flow, LinkingFlow::Idle));
    }

    #[tokio::test]
    async fn test_lossy_link_response_is_rejected_not_persisted() {
        let provider = seeded_password_provider("a@x.com", "hunter2hunter2").await;
        provider.lossy_link.store(true, Ordering::SeqCst);
        let mut flow = LinkingFlow::new();

        flow.detect(&provider, &email("a@x.com"), SignInMethod::Google)
            .await
            .unwrap();
        flow.await_confirmation().unwrap();

        let log = recorder();
        let result = flow
            .confirm(
                &provider,
                LinkCredential::Password {
                    email: email("a@x.com"),
                    password: "hunter2hunter2".to_owned(),
                },
                LinkCredential::Google {
                    id_token: "gtok:a@x.com".to_owned(),
                },
                persist_into(&log),
            )
            .await;

        // A post-link set that is a strict subset of the pre-existing one
        // must never be stored.
        assert!(matches!(result, Err(AuthError::LinkFailed)));
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_confirm_outside_awaiting_state_is_rejected() {
        let provider = FakeProvider::new();
        let mut flow = LinkingFlow::new();

        let log = recorder();
        let result = flow
            .confirm(
                &provider,
                LinkCredential::Password {
                    email: email("a@x.com"),
                    password: "hunter2hunter2".to_owned(),
                },
                LinkCredential::Google {
                    id_token: "gtok:a@x.com".to_owned(),
                },
                persist_into(&log),
            )
            .await;

        assert!(matches!(result, Err(AuthError::InvalidLinkState)));
        assert_eq!(provider.call_count(), 0);
    }

    // =========================================================================
    // Unlink guard
    // =========================================================================

    #[tokio::test]
    async fn test_unlink_sole_method_rejected_without_network_call() {
        let provider = FakeProvider::new();

        let log = recorder();
        let log2 = Arc::clone(&log);
        let result = unlink(
            &provider,
            &[SignInMethod::Password],
            "tok:a@x.com",
            SignInMethod::Password,
            move |methods| {
                log2.lock().unwrap().push((Uid::new("u"), methods));
                ready(Ok(()))
            },
        )
        .await;

        assert!(matches!(result, Err(AuthError::LastMethod)));
        assert_eq!(provider.call_count(), 0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unlink_unknown_method_rejected_locally() {
        let provider = FakeProvider::new();

        let result = guard_unlink(
            &[SignInMethod::Password, SignInMethod::Password],
            SignInMethod::Google,
        );
        assert!(matches!(result, Err(AuthError::MethodNotLinked)));
        assert_eq!(provider.call_count(), 0);

        // Both methods linked: the guard passes for either.
        assert!(guard_unlink(
            &[SignInMethod::Password, SignInMethod::Google],
            SignInMethod::Google
        )
        .is_ok());
    }

    #[tokio::test]
    async fn test_unlink_one_of_two_then_last_is_guarded() {
        let provider = seeded_password_provider("a@x.com", "hunter2hunter2").await;
        provider.link_google("tok:a@x.com", "gtok:a@x.com").await.unwrap();

        let remaining = unlink(
            &provider,
            &[SignInMethod::Password, SignInMethod::Google],
            "tok:a@x.com",
            SignInMethod::Google,
            |_methods| ready(Ok(())),
        )
        .await
        .unwrap();

        assert_eq!(remaining, vec![SignInMethod::Password]);
        let live = provider.lookup("tok:a@x.com").await.unwrap().providers;
        assert_eq!(live, vec![SignInMethod::Password]);

        // The single remaining method can no longer be unlinked.
        let calls_before = provider.call_count();
        let result = unlink(
            &provider,
            &remaining,
            "tok:a@x.com",
            SignInMethod::Password,
            |_methods| ready(Ok(())),
        )
        .await;
        assert!(matches!(result, Err(AuthError::LastMethod)));
        assert_eq!(provider.call_count(), calls_before);
    }
}
