//! Achievement domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use hackdeck_core::{AchievementId, AchievementKind, Uid};

/// An achievement awarded to a user. Each kind is awarded at most once;
/// the document id is derived from `(uid, kind)` to enforce that in the
/// store.
#[derive(Debug, Clone, Serialize)]
pub struct Achievement {
    pub id: AchievementId,
    pub recipient_uid: Uid,
    pub kind: AchievementKind,
    pub awarded_at: DateTime<Utc>,
}
