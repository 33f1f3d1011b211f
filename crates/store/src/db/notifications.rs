//! Notification repository.

use chrono::Utc;
use uuid::Uuid;

use hackdeck_core::{NotificationId, NotificationKind, Uid};

use super::{RepositoryError, collections, corrupt};
use crate::firestore::{Direction, Document, Fields, FirestoreClient, Op, Query, Value};
use crate::models::notification::Notification;

/// Repository for the `notifications` collection.
pub struct NotificationRepository<'a> {
    store: &'a FirestoreClient,
}

impl<'a> NotificationRepository<'a> {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(store: &'a FirestoreClient) -> Self {
        Self { store }
    }

    /// Deliver a notification to a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn create(
        &self,
        recipient: &Uid,
        kind: NotificationKind,
        message: &str,
    ) -> Result<Notification, RepositoryError> {
        let id = Uuid::new_v4().simple().to_string();

        let mut fields = Fields::new();
        fields.insert(
            "recipientUid".to_owned(),
            Value::string(recipient.as_str()),
        );
        fields.insert("kind".to_owned(), Value::string(kind_str(kind)));
        fields.insert("message".to_owned(), Value::string(message));
        fields.insert("read".to_owned(), Value::boolean(false));
        fields.insert("createdAt".to_owned(), Value::timestamp(Utc::now()));

        let doc = self
            .store
            .create_document(collections::NOTIFICATIONS, Some(&id), fields)
            .await?;
        from_document(&doc)
    }

    /// A user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn list_for(
        &self,
        recipient: &Uid,
        unread_only: bool,
        limit: u32,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let mut query = Query::collection(collections::NOTIFICATIONS)
            .filter("recipientUid", Op::Equal, Value::string(recipient.as_str()))
            .order_by("createdAt", Direction::Descending)
            .limit(limit);

        if unread_only {
            query = query.filter("read", Op::Equal, Value::boolean(false));
        }

        let docs = self.store.run_query(&query).await?;
        docs.iter().map(from_document).collect()
    }

    /// Mark one notification read. Returns `false` if it does not exist or
    /// belongs to someone else.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn mark_read(
        &self,
        recipient: &Uid,
        id: &NotificationId,
    ) -> Result<bool, RepositoryError> {
        let Some(doc) = self
            .store
            .get_document(collections::NOTIFICATIONS, id.as_str())
            .await?
        else {
            return Ok(false);
        };
        if doc.str_field("recipientUid") != Some(recipient.as_str()) {
            return Ok(false);
        }

        let mut fields = Fields::new();
        fields.insert("read".to_owned(), Value::boolean(true));
        self.store
            .patch_document(collections::NOTIFICATIONS, id.as_str(), fields)
            .await?;
        Ok(true)
    }

    /// Mark all of a user's unread notifications read. Returns how many were
    /// updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn mark_all_read(&self, recipient: &Uid) -> Result<usize, RepositoryError> {
        let unread = self.list_for(recipient, true, 500).await?;
        let count = unread.len();

        for notification in &unread {
            let mut fields = Fields::new();
            fields.insert("read".to_owned(), Value::boolean(true));
            self.store
                .patch_document(collections::NOTIFICATIONS, notification.id.as_str(), fields)
                .await?;
        }

        Ok(count)
    }

    /// Delete all notifications for a user. Returns how many were deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn delete_all_for(&self, recipient: &Uid) -> Result<usize, RepositoryError> {
        let all = self.list_for(recipient, false, 500).await?;
        let count = all.len();

        for notification in &all {
            self.store
                .delete_document(collections::NOTIFICATIONS, notification.id.as_str())
                .await?;
        }

        Ok(count)
    }
}

const fn kind_str(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::ApplicationUpdate => "application_update",
        NotificationKind::ProjectLike => "project_like",
        NotificationKind::Achievement => "achievement",
        NotificationKind::HostRequest => "host_request",
        NotificationKind::System => "system",
    }
}

fn parse_kind(s: &str) -> Option<NotificationKind> {
    match s {
        "application_update" => Some(NotificationKind::ApplicationUpdate),
        "project_like" => Some(NotificationKind::ProjectLike),
        "achievement" => Some(NotificationKind::Achievement),
        "host_request" => Some(NotificationKind::HostRequest),
        "system" => Some(NotificationKind::System),
        _ => None,
    }
}

fn from_document(doc: &Document) -> Result<Notification, RepositoryError> {
    let id = doc.id();
    let recipient = doc
        .str_field("recipientUid")
        .ok_or_else(|| corrupt(collections::NOTIFICATIONS, id, "recipientUid"))?;
    let kind = doc
        .str_field("kind")
        .and_then(parse_kind)
        .ok_or_else(|| corrupt(collections::NOTIFICATIONS, id, "kind"))?;
    let message = doc
        .str_field("message")
        .ok_or_else(|| corrupt(collections::NOTIFICATIONS, id, "message"))?;

    Ok(Notification {
        id: NotificationId::new(id),
        recipient_uid: Uid::new(recipient),
        kind,
        message: message.to_owned(),
        read: doc.bool_field_or_false("read"),
        created_at: doc.create_time,
        updated_at: doc.update_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        for kind in [
            NotificationKind::ApplicationUpdate,
            NotificationKind::ProjectLike,
            NotificationKind::Achievement,
            NotificationKind::HostRequest,
            NotificationKind::System,
        ] {
            assert_eq!(parse_kind(kind_str(kind)), Some(kind));
        }
    }
}
