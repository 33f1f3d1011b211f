//! Application state shared across handlers.

use std::sync::Arc;

use hackdeck_store::firestore::FirestoreClient;

use crate::config::AdminConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AdminState {
    inner: Arc<AdminStateInner>,
}

struct AdminStateInner {
    config: AdminConfig,
    firestore: FirestoreClient,
}

impl AdminState {
    /// Create a new application state from configuration.
    #[must_use]
    pub fn new(config: AdminConfig) -> Self {
        let firestore = FirestoreClient::new(&config.firestore);
        Self {
            inner: Arc::new(AdminStateInner { config, firestore }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the document store client.
    #[must_use]
    pub fn firestore(&self) -> &FirestoreClient {
        &self.inner.firestore
    }
}
