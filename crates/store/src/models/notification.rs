//! Notification domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use hackdeck_core::{NotificationId, NotificationKind, Uid};

/// A notification delivered to one user.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient_uid: Uid,
    pub kind: NotificationKind,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
