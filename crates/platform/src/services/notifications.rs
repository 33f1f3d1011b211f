//! Notification service.

use hackdeck_core::{NotificationId, Uid};
use hackdeck_store::db::NotificationRepository;
use hackdeck_store::firestore::FirestoreClient;
use hackdeck_store::models::Notification;

use crate::error::Result;

/// Default page size for notification listings.
const DEFAULT_LIMIT: u32 = 50;

/// Notification read/ack operations.
pub struct NotificationService<'a> {
    notifications: NotificationRepository<'a>,
}

impl<'a> NotificationService<'a> {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(store: &'a FirestoreClient) -> Self {
        Self {
            notifications: NotificationRepository::new(store),
        }
    }

    /// The caller's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store call fails.
    pub async fn list(&self, uid: &Uid, unread_only: bool) -> Result<Vec<Notification>> {
        Ok(self
            .notifications
            .list_for(uid, unread_only, DEFAULT_LIMIT)
            .await?)
    }

    /// Mark one notification read. Returns `false` when it doesn't exist or
    /// isn't the caller's.
    ///
    /// # Errors
    ///
    /// Returns an error if the store call fails.
    pub async fn mark_read(&self, uid: &Uid, id: &NotificationId) -> Result<bool> {
        Ok(self.notifications.mark_read(uid, id).await?)
    }

    /// Mark all unread notifications read. Returns the count updated.
    ///
    /// # Errors
    ///
    /// Returns an error if the store call fails.
    pub async fn mark_all_read(&self, uid: &Uid) -> Result<usize> {
        Ok(self.notifications.mark_all_read(uid).await?)
    }
}
