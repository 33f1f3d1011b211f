//! Saved/liked item repository.
//!
//! Deterministic ids (`{uid}_{itemId}`) make save and like idempotent
//! toggles: creating an existing record is "already saved/liked", deleting
//! an absent one is a no-op.

use chrono::Utc;

use hackdeck_core::{ProjectId, Uid};

use super::{RepositoryError, collections, corrupt};
use crate::firestore::{Direction, Document, Fields, FirestoreClient, Op, Query, StoreError, Value};
use crate::models::engagement::{LikedItem, SavedItem, SavedItemKind};

/// Repository for the `saved_items` and `liked_items` collections.
pub struct EngagementRepository<'a> {
    store: &'a FirestoreClient,
}

impl<'a> EngagementRepository<'a> {
    /// Create a new engagement repository.
    #[must_use]
    pub const fn new(store: &'a FirestoreClient) -> Self {
        Self { store }
    }

    fn join_id(uid: &Uid, item_id: &str) -> String {
        format!("{}_{item_id}", uid.as_str())
    }

    // =========================================================================
    // Saved items
    // =========================================================================

    /// Save an item. Returns `false` if it was already saved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn save(
        &self,
        uid: &Uid,
        kind: SavedItemKind,
        item_id: &str,
    ) -> Result<bool, RepositoryError> {
        let id = Self::join_id(uid, item_id);

        let mut fields = Fields::new();
        fields.insert("uid".to_owned(), Value::string(uid.as_str()));
        fields.insert("kind".to_owned(), Value::string(kind.as_str()));
        fields.insert("itemId".to_owned(), Value::string(item_id));
        fields.insert("createdAt".to_owned(), Value::timestamp(Utc::now()));

        match self
            .store
            .create_document(collections::SAVED_ITEMS, Some(&id), fields)
            .await
        {
            Ok(_) => Ok(true),
            Err(StoreError::AlreadyExists) => Ok(false),
            Err(other) => Err(RepositoryError::Store(other)),
        }
    }

    /// Remove a saved item. Removing an absent record is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn unsave(&self, uid: &Uid, item_id: &str) -> Result<(), RepositoryError> {
        self.store
            .delete_document(collections::SAVED_ITEMS, &Self::join_id(uid, item_id))
            .await?;
        Ok(())
    }

    /// Whether the user has saved this item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn is_saved(&self, uid: &Uid, item_id: &str) -> Result<bool, RepositoryError> {
        Ok(self
            .store
            .get_document(collections::SAVED_ITEMS, &Self::join_id(uid, item_id))
            .await?
            .is_some())
    }

    /// A user's saved items, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn list_saved(&self, uid: &Uid) -> Result<Vec<SavedItem>, RepositoryError> {
        let docs = self
            .store
            .run_query(
                &Query::collection(collections::SAVED_ITEMS)
                    .filter("uid", Op::Equal, Value::string(uid.as_str()))
                    .order_by("createdAt", Direction::Descending),
            )
            .await?;
        docs.iter().map(saved_from_document).collect()
    }

    // =========================================================================
    // Liked items
    // =========================================================================

    /// Like a project. Returns `false` if it was already liked; the caller
    /// only bumps the project counter on `true`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn like(&self, uid: &Uid, project: &ProjectId) -> Result<bool, RepositoryError> {
        let id = Self::join_id(uid, project.as_str());

        let mut fields = Fields::new();
        fields.insert("uid".to_owned(), Value::string(uid.as_str()));
        fields.insert("projectId".to_owned(), Value::string(project.as_str()));
        fields.insert("createdAt".to_owned(), Value::timestamp(Utc::now()));

        match self
            .store
            .create_document(collections::LIKED_ITEMS, Some(&id), fields)
            .await
        {
            Ok(_) => Ok(true),
            Err(StoreError::AlreadyExists) => Ok(false),
            Err(other) => Err(RepositoryError::Store(other)),
        }
    }

    /// Remove a like. Returns `false` if there was no like to remove, so the
    /// caller knows whether to decrement the project counter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn unlike(&self, uid: &Uid, project: &ProjectId) -> Result<bool, RepositoryError> {
        let id = Self::join_id(uid, project.as_str());

        // Existence check first: delete succeeds on absent documents, but the
        // counter must only move when a like actually existed.
        if self
            .store
            .get_document(collections::LIKED_ITEMS, &id)
            .await?
            .is_none()
        {
            return Ok(false);
        }

        self.store
            .delete_document(collections::LIKED_ITEMS, &id)
            .await?;
        Ok(true)
    }

    /// Whether the user has liked this project.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn is_liked(&self, uid: &Uid, project: &ProjectId) -> Result<bool, RepositoryError> {
        Ok(self
            .store
            .get_document(collections::LIKED_ITEMS, &Self::join_id(uid, project.as_str()))
            .await?
            .is_some())
    }

    /// A user's likes, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn list_likes(&self, uid: &Uid) -> Result<Vec<LikedItem>, RepositoryError> {
        let docs = self
            .store
            .run_query(
                &Query::collection(collections::LIKED_ITEMS)
                    .filter("uid", Op::Equal, Value::string(uid.as_str()))
                    .order_by("createdAt", Direction::Descending),
            )
            .await?;
        docs.iter().map(liked_from_document).collect()
    }

    // =========================================================================
    // Cascade
    // =========================================================================

    /// Delete all engagement records for a user. Returns how many were
    /// deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn delete_all_for(&self, uid: &Uid) -> Result<usize, RepositoryError> {
        let saved = self.list_saved(uid).await?;
        let likes = self.list_likes(uid).await?;
        let count = saved.len() + likes.len();

        for item in &saved {
            self.store
                .delete_document(collections::SAVED_ITEMS, &Self::join_id(uid, &item.item_id))
                .await?;
        }
        for like in &likes {
            self.store
                .delete_document(
                    collections::LIKED_ITEMS,
                    &Self::join_id(uid, like.project_id.as_str()),
                )
                .await?;
        }

        Ok(count)
    }
}

fn saved_from_document(doc: &Document) -> Result<SavedItem, RepositoryError> {
    let id = doc.id();
    let uid = doc
        .str_field("uid")
        .ok_or_else(|| corrupt(collections::SAVED_ITEMS, id, "uid"))?;
    let kind = doc
        .str_field("kind")
        .and_then(SavedItemKind::parse)
        .ok_or_else(|| corrupt(collections::SAVED_ITEMS, id, "kind"))?;
    let item_id = doc
        .str_field("itemId")
        .ok_or_else(|| corrupt(collections::SAVED_ITEMS, id, "itemId"))?;

    Ok(SavedItem {
        uid: Uid::new(uid),
        kind,
        item_id: item_id.to_owned(),
        created_at: doc.create_time,
    })
}

fn liked_from_document(doc: &Document) -> Result<LikedItem, RepositoryError> {
    let id = doc.id();
    let uid = doc
        .str_field("uid")
        .ok_or_else(|| corrupt(collections::LIKED_ITEMS, id, "uid"))?;
    let project = doc
        .str_field("projectId")
        .ok_or_else(|| corrupt(collections::LIKED_ITEMS, id, "projectId"))?;

    Ok(LikedItem {
        uid: Uid::new(uid),
        project_id: ProjectId::new(project),
        created_at: doc.create_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_id_format() {
        assert_eq!(
            EngagementRepository::join_id(&Uid::new("u1"), "p9"),
            "u1_p9"
        );
    }
}
