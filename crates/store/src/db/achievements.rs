//! Achievement repository.
//!
//! Document ids are `{uid}_{kind}`, so each kind is awarded at most once per
//! user; re-awarding is a store-level conflict that reads as "already
//! awarded".

use chrono::Utc;

use hackdeck_core::{AchievementId, AchievementKind, Uid};

use super::{RepositoryError, collections, corrupt};
use crate::firestore::{Direction, Document, Fields, FirestoreClient, Op, Query, StoreError, Value};
use crate::models::achievement::Achievement;

/// Repository for the `achievements` collection.
pub struct AchievementRepository<'a> {
    store: &'a FirestoreClient,
}

impl<'a> AchievementRepository<'a> {
    /// Create a new achievement repository.
    #[must_use]
    pub const fn new(store: &'a FirestoreClient) -> Self {
        Self { store }
    }

    /// Award an achievement. Returns `None` if the user already has it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn award(
        &self,
        recipient: &Uid,
        kind: AchievementKind,
    ) -> Result<Option<Achievement>, RepositoryError> {
        let id = format!("{}_{}", recipient.as_str(), kind_str(kind));

        let mut fields = Fields::new();
        fields.insert(
            "recipientUid".to_owned(),
            Value::string(recipient.as_str()),
        );
        fields.insert("kind".to_owned(), Value::string(kind_str(kind)));
        fields.insert("createdAt".to_owned(), Value::timestamp(Utc::now()));

        match self
            .store
            .create_document(collections::ACHIEVEMENTS, Some(&id), fields)
            .await
        {
            Ok(doc) => from_document(&doc).map(Some),
            Err(StoreError::AlreadyExists) => Ok(None),
            Err(other) => Err(RepositoryError::Store(other)),
        }
    }

    /// A user's achievements, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn list_for(&self, recipient: &Uid) -> Result<Vec<Achievement>, RepositoryError> {
        let docs = self
            .store
            .run_query(
                &Query::collection(collections::ACHIEVEMENTS)
                    .filter("recipientUid", Op::Equal, Value::string(recipient.as_str()))
                    .order_by("createdAt", Direction::Descending),
            )
            .await?;
        docs.iter().map(from_document).collect()
    }

    /// Delete all achievements for a user. Returns how many were deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn delete_all_for(&self, recipient: &Uid) -> Result<usize, RepositoryError> {
        let all = self.list_for(recipient).await?;
        let count = all.len();

        for achievement in &all {
            self.store
                .delete_document(collections::ACHIEVEMENTS, achievement.id.as_str())
                .await?;
        }

        Ok(count)
    }
}

const fn kind_str(kind: AchievementKind) -> &'static str {
    match kind {
        AchievementKind::FirstProject => "first_project",
        AchievementKind::FirstApplication => "first_application",
        AchievementKind::ProfileComplete => "profile_complete",
        AchievementKind::FirstHackathonHosted => "first_hackathon_hosted",
    }
}

fn parse_kind(s: &str) -> Option<AchievementKind> {
    match s {
        "first_project" => Some(AchievementKind::FirstProject),
        "first_application" => Some(AchievementKind::FirstApplication),
        "profile_complete" => Some(AchievementKind::ProfileComplete),
        "first_hackathon_hosted" => Some(AchievementKind::FirstHackathonHosted),
        _ => None,
    }
}

fn from_document(doc: &Document) -> Result<Achievement, RepositoryError> {
    let id = doc.id();
    let recipient = doc
        .str_field("recipientUid")
        .ok_or_else(|| corrupt(collections::ACHIEVEMENTS, id, "recipientUid"))?;
    let kind = doc
        .str_field("kind")
        .and_then(parse_kind)
        .ok_or_else(|| corrupt(collections::ACHIEVEMENTS, id, "kind"))?;

    Ok(Achievement {
        id: AchievementId::new(id),
        recipient_uid: Uid::new(recipient),
        kind,
        awarded_at: doc.create_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        for kind in [
            AchievementKind::FirstProject,
            AchievementKind::FirstApplication,
            AchievementKind::ProfileComplete,
            AchievementKind::FirstHackathonHosted,
        ] {
            assert_eq!(parse_kind(kind_str(kind)), Some(kind));
        }
    }
}
