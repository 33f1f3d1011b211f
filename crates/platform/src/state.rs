//! Application state shared across handlers.

use std::sync::Arc;

use hackdeck_core::Uid;
use hackdeck_store::db::users::UserRepository;
use hackdeck_store::firestore::FirestoreClient;
use hackdeck_store::identity::{AuthProvider, IdentityClient};

use crate::config::PlatformConfig;
use crate::services::auth::SessionTracker;
use crate::services::email::EmailClient;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The auth provider is held behind the
/// [`AuthProvider`] trait, injected at construction rather than reached
/// through a global.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PlatformConfig,
    firestore: FirestoreClient,
    provider: Arc<dyn AuthProvider>,
    email: EmailClient,
    tracker: SessionTracker,
}

impl AppState {
    /// Create a new application state from configuration.
    #[must_use]
    pub fn new(config: PlatformConfig) -> Self {
        let firestore = FirestoreClient::new(&config.firestore);
        let provider: Arc<dyn AuthProvider> =
            Arc::new(IdentityClient::new(&config.identity));
        let email = EmailClient::new(config.email_functions_url.clone());

        let tracker = {
            let store = firestore.clone();
            SessionTracker::new(Arc::new(move |uid: Uid| {
                let store = store.clone();
                Box::pin(async move { UserRepository::new(&store).get(&uid).await })
            }))
        };

        Self {
            inner: Arc::new(AppStateInner {
                config,
                firestore,
                provider,
                email,
                tracker,
            }),
        }
    }

    /// Get a reference to the platform configuration.
    #[must_use]
    pub fn config(&self) -> &PlatformConfig {
        &self.inner.config
    }

    /// Get a reference to the document store client.
    #[must_use]
    pub fn firestore(&self) -> &FirestoreClient {
        &self.inner.firestore
    }

    /// Get the auth provider.
    #[must_use]
    pub fn provider(&self) -> &dyn AuthProvider {
        self.inner.provider.as_ref()
    }

    /// Get a reference to the email functions client.
    #[must_use]
    pub fn email(&self) -> &EmailClient {
        &self.inner.email
    }

    /// Get a reference to the auth session tracker.
    #[must_use]
    pub fn tracker(&self) -> &SessionTracker {
        &self.inner.tracker
    }
}
