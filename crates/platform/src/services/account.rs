//! Account deletion.
//!
//! The "delete own account" path removes per-collection documents
//! individually rather than transactionally: each collection's cascade is
//! attempted independently, failures are logged and not rolled back, and
//! the identity deletion proceeds regardless. A partially failed run can
//! leave orphaned child records. Projects are not cascaded at all - the
//! showcase outlives the account, with the owner id now dangling.

use serde::Serialize;

use hackdeck_core::Uid;
use hackdeck_store::db::{
    AchievementRepository, ApplicationRepository, EngagementRepository, NotificationRepository,
    UserRepository,
};
use hackdeck_store::firestore::FirestoreClient;
use hackdeck_store::identity::AuthProvider;

use crate::error::Result;
use crate::services::auth::AuthError;

/// What the cascade managed to remove.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeletionReport {
    /// Documents removed across all collections.
    pub deleted: usize,
    /// Collections whose cascade failed (documents left behind).
    pub failed_collections: Vec<String>,
}

/// Account deletion operations.
pub struct AccountService<'a> {
    provider: &'a dyn AuthProvider,
    store: &'a FirestoreClient,
}

impl<'a> AccountService<'a> {
    /// Create a new account service.
    #[must_use]
    pub const fn new(provider: &'a dyn AuthProvider, store: &'a FirestoreClient) -> Self {
        Self { provider, store }
    }

    /// Delete the caller's account: best-effort per-collection cascade, then
    /// the profile, then the identity itself.
    ///
    /// # Errors
    ///
    /// Returns an error only when the identity deletion fails; cascade
    /// failures are reported, not raised.
    pub async fn delete_account(
        &self,
        uid: &Uid,
        session_token: &str,
    ) -> Result<DeletionReport> {
        let mut report = DeletionReport::default();

        let applications = ApplicationRepository::new(self.store);
        match applications.list_by_applicant(uid).await {
            Ok(list) => {
                for application in &list {
                    match applications.delete(&application.id).await {
                        Ok(()) => report.deleted += 1,
                        Err(err) => {
                            tracing::warn!(uid = %uid, error = %err, "application cascade delete failed");
                            note_failure(&mut report, "applications");
                        }
                    }
                }
            }
            Err(err) => {
                tracing::warn!(uid = %uid, error = %err, "application cascade listing failed");
                note_failure(&mut report, "applications");
            }
        }

        match NotificationRepository::new(self.store).delete_all_for(uid).await {
            Ok(count) => report.deleted += count,
            Err(err) => {
                tracing::warn!(uid = %uid, error = %err, "notification cascade delete failed");
                note_failure(&mut report, "notifications");
            }
        }

        match AchievementRepository::new(self.store).delete_all_for(uid).await {
            Ok(count) => report.deleted += count,
            Err(err) => {
                tracing::warn!(uid = %uid, error = %err, "achievement cascade delete failed");
                note_failure(&mut report, "achievements");
            }
        }

        match EngagementRepository::new(self.store).delete_all_for(uid).await {
            Ok(count) => report.deleted += count,
            Err(err) => {
                tracing::warn!(uid = %uid, error = %err, "engagement cascade delete failed");
                note_failure(&mut report, "saved/liked items");
            }
        }

        match UserRepository::new(self.store).delete(uid).await {
            Ok(()) => report.deleted += 1,
            Err(err) => {
                tracing::warn!(uid = %uid, error = %err, "profile delete failed");
                note_failure(&mut report, "users");
            }
        }

        // The identity deletion is the one step that must succeed; a dead
        // identity with leftover documents beats a live identity with a
        // deleted profile.
        self.provider
            .delete_account(session_token)
            .await
            .map_err(AuthError::from)?;

        Ok(report)
    }
}

fn note_failure(report: &mut DeletionReport, collection: &str) {
    if !report.failed_collections.iter().any(|c| c == collection) {
        report.failed_collections.push(collection.to_owned());
    }
}
