//! Authentication session reconciliation.
//!
//! Tracks the resolved auth state per identity, driven by sign-in/sign-out
//! events. On a sign-in event the stored profile is fetched asynchronously;
//! the tracked state moves through exactly:
//!
//! ```text
//! unresolved -> signed-out
//! unresolved -> resolving (session, no profile) -> signed-in (session, profile)
//!                                               -> signed-out (fetch failed/empty)
//! ```
//!
//! Events can interleave with in-flight fetches (sign-in immediately
//! followed by sign-out before the fetch resolves). The latest event wins:
//! every event bumps an epoch, and a fetch resolution carrying a stale epoch
//! is discarded, not applied.
//!
//! The profile fetcher is injected at construction rather than reached
//! through ambient state, so the reconciler can be driven hermetically in
//! tests.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use hackdeck_core::Uid;
use hackdeck_store::db::RepositoryError;
use hackdeck_store::identity::AuthSession;
use hackdeck_store::models::UserProfile;

/// Resolved authentication state for one identity.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AuthSnapshot {
    /// No auth event seen yet.
    Unresolved,
    /// Signed out, or a profile fetch failed and the session was dropped.
    SignedOut,
    /// Session present, profile fetch in flight.
    Resolving { session: AuthSession },
    /// Session present with its stored profile.
    SignedIn {
        session: AuthSession,
        profile: Box<UserProfile>,
    },
}

impl AuthSnapshot {
    /// Whether this snapshot represents an authenticated user with a full
    /// profile. `Resolving` is not authenticated yet; a session without a
    /// profile never counts.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::SignedIn { .. })
    }
}

/// Future returned by a profile fetcher.
pub type ProfileFetch =
    Pin<Box<dyn Future<Output = Result<Option<UserProfile>, RepositoryError>> + Send>>;

/// Injected profile lookup.
pub type ProfileFetcher = Arc<dyn Fn(Uid) -> ProfileFetch + Send + Sync>;

struct Entry {
    /// Bumped on every auth event; stale fetch resolutions compare unequal.
    epoch: u64,
    snapshot: AuthSnapshot,
}

/// Per-identity auth state reconciler.
#[derive(Clone)]
pub struct SessionTracker {
    inner: Arc<TrackerInner>,
}

struct TrackerInner {
    fetcher: ProfileFetcher,
    entries: Mutex<HashMap<Uid, Entry>>,
}

impl SessionTracker {
    /// Create a tracker with the given profile fetcher.
    #[must_use]
    pub fn new(fetcher: ProfileFetcher) -> Self {
        Self {
            inner: Arc::new(TrackerInner {
                fetcher,
                entries: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Handle a sign-in event: record the session as resolving and fetch its
    /// profile in the background.
    ///
    /// The returned handle is the background resolution; production callers
    /// drop it, tests await it.
    pub fn signed_in(&self, session: AuthSession) -> tokio::task::JoinHandle<()> {
        let uid = session.uid.clone();
        let epoch = self.bump(&uid, AuthSnapshot::Resolving {
            session: session.clone(),
        });

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let result = (inner.fetcher)(uid.clone()).await;

            let mut entries = inner.entries.lock().unwrap_or_else(|e| e.into_inner());
            let Some(entry) = entries.get_mut(&uid) else {
                return;
            };
            if entry.epoch != epoch {
                // A newer event won; this resolution is stale.
                tracing::debug!(uid = %uid, "discarding stale profile resolution");
                return;
            }

            entry.snapshot = match result {
                Ok(Some(profile)) => AuthSnapshot::SignedIn {
                    session,
                    profile: Box::new(profile),
                },
                Ok(None) => {
                    tracing::warn!(
                        uid = %uid,
                        "no profile for authenticated session, treating as signed out"
                    );
                    AuthSnapshot::SignedOut
                }
                Err(err) => {
                    tracing::warn!(
                        uid = %uid,
                        error = %err,
                        "profile fetch failed, treating as signed out"
                    );
                    AuthSnapshot::SignedOut
                }
            };
        })
    }

    /// Handle a sign-out event.
    pub fn signed_out(&self, uid: &Uid) {
        self.bump(uid, AuthSnapshot::SignedOut);
    }

    /// The current snapshot for an identity.
    #[must_use]
    pub fn snapshot(&self, uid: &Uid) -> AuthSnapshot {
        let entries = self.inner.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(uid)
            .map_or(AuthSnapshot::Unresolved, |e| e.snapshot.clone())
    }

    /// Drop all tracked state for an identity (account deletion).
    pub fn remove(&self, uid: &Uid) {
        let mut entries = self.inner.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(uid);
    }

    /// Record an event: bump the epoch and set the snapshot. Returns the new
    /// epoch.
    fn bump(&self, uid: &Uid, snapshot: AuthSnapshot) -> u64 {
        let mut entries = self.inner.entries.lock().unwrap_or_else(|e| e.into_inner());
        let entry = entries.entry(uid.clone()).or_insert(Entry {
            epoch: 0,
            snapshot: AuthSnapshot::Unresolved,
        });
        entry.epoch += 1;
        entry.snapshot = snapshot;
        entry.epoch
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::collections::HashMap as StdHashMap;
    use std::sync::Mutex as StdMutex;

    use chrono::Utc;
    use hackdeck_core::Email;
    use tokio::sync::oneshot;

    fn session(uid: &str) -> AuthSession {
        AuthSession {
            uid: Uid::new(uid),
            email: Email::parse(&format!("{uid}@example.com")).unwrap(),
            display_name: None,
            email_verified: true,
            id_token: format!("tok-{uid}"),
            refresh_token: None,
            providers: vec![hackdeck_core::SignInMethod::Password],
        }
    }

    fn profile(uid: &str) -> UserProfile {
        UserProfile {
            uid: Uid::new(uid),
            email: Email::parse(&format!("{uid}@example.com")).unwrap(),
            display_name: Some("Test".to_owned()),
            bio: None,
            skills: vec![],
            avatar_url: None,
            location: None,
            role: None,
            github_url: None,
            website_url: None,
            is_host: false,
            linked_methods: vec![hackdeck_core::SignInMethod::Password],
            completeness: 15,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Fetcher backed by a map of canned results.
    fn map_fetcher(profiles: StdHashMap<String, UserProfile>) -> ProfileFetcher {
        let profiles = Arc::new(profiles);
        Arc::new(move |uid: Uid| {
            let profiles = Arc::clone(&profiles);
            Box::pin(async move { Ok(profiles.get(uid.as_str()).cloned()) })
        })
    }

    /// Fetcher that fails every fetch.
    fn failing_fetcher() -> ProfileFetcher {
        Arc::new(|_uid| {
            Box::pin(async {
                Err(RepositoryError::DataCorruption("boom".to_owned()))
            })
        })
    }

    /// Fetcher that waits for a release signal before resolving.
    fn gated_fetcher(
        rx: oneshot::Receiver<Option<UserProfile>>,
    ) -> ProfileFetcher {
        let rx = StdMutex::new(Some(rx));
        Arc::new(move |_uid| {
            let rx = rx.lock().unwrap().take();
            Box::pin(async move {
                match rx {
                    Some(rx) => Ok(rx.await.unwrap_or(None)),
                    None => Ok(None),
                }
            })
        })
    }

    #[tokio::test]
    async fn test_starts_unresolved() {
        let tracker = SessionTracker::new(map_fetcher(StdHashMap::new()));
        assert!(matches!(
            tracker.snapshot(&Uid::new("u1")),
            AuthSnapshot::Unresolved
        ));
    }

    #[tokio::test]
    async fn test_sign_in_resolves_to_signed_in() {
        let mut profiles = StdHashMap::new();
        profiles.insert("u1".to_owned(), profile("u1"));
        let tracker = SessionTracker::new(map_fetcher(profiles));

        let handle = tracker.signed_in(session("u1"));
        handle.await.unwrap();

        let snapshot = tracker.snapshot(&Uid::new("u1"));
        assert!(snapshot.is_authenticated());
        match snapshot {
            AuthSnapshot::SignedIn { profile, .. } => {
                assert_eq!(profile.uid.as_str(), "u1");
            }
            other => panic!("expected SignedIn, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_profile_resolves_to_signed_out() {
        let tracker = SessionTracker::new(map_fetcher(StdHashMap::new()));

        let handle = tracker.signed_in(session("u1"));
        handle.await.unwrap();

        assert!(matches!(
            tracker.snapshot(&Uid::new("u1")),
            AuthSnapshot::SignedOut
        ));
    }

    #[tokio::test]
    async fn test_failed_fetch_resolves_to_signed_out() {
        let tracker = SessionTracker::new(failing_fetcher());

        let handle = tracker.signed_in(session("u1"));
        handle.await.unwrap();

        let snapshot = tracker.snapshot(&Uid::new("u1"));
        assert!(matches!(snapshot, AuthSnapshot::SignedOut));
        assert!(!snapshot.is_authenticated());
    }

    #[tokio::test]
    async fn test_stale_resolution_is_discarded_after_sign_out() {
        let (tx, rx) = oneshot::channel();
        let tracker = SessionTracker::new(gated_fetcher(rx));
        let uid = Uid::new("u1");

        // Sign-in with the fetch still pending...
        let handle = tracker.signed_in(session("u1"));
        assert!(matches!(
            tracker.snapshot(&uid),
            AuthSnapshot::Resolving { .. }
        ));

        // ...then sign-out before it resolves.
        tracker.signed_out(&uid);

        // Late resolution arrives with a profile; it must be discarded.
        tx.send(Some(profile("u1"))).unwrap();
        handle.await.unwrap();

        assert!(matches!(tracker.snapshot(&uid), AuthSnapshot::SignedOut));
    }

    #[tokio::test]
    async fn test_latest_sign_in_wins_over_earlier_pending_fetch() {
        let (tx_old, rx_old) = oneshot::channel();
        let tracker = SessionTracker::new(gated_fetcher(rx_old));
        let uid = Uid::new("u1");

        // First sign-in: fetch pending.
        let old_handle = tracker.signed_in(session("u1"));

        // Second sign-in on a tracker whose fetcher resolves immediately
        // (the gate was consumed by the first call).
        let new_handle = tracker.signed_in(session("u1"));
        new_handle.await.unwrap();

        // The second fetch found no profile -> SignedOut. The first, stale
        // resolution must not overwrite that with SignedIn.
        tx_old.send(Some(profile("u1"))).unwrap();
        old_handle.await.unwrap();

        assert!(matches!(tracker.snapshot(&uid), AuthSnapshot::SignedOut));
    }
}
