//! Project repository.

use chrono::Utc;
use uuid::Uuid;

use hackdeck_core::{HackathonId, ProjectId, Uid};

use super::{RepositoryError, collections, corrupt};
use crate::firestore::{Direction, Document, Fields, FirestoreClient, Op, Query, Value};
use crate::models::project::{NewProject, Project, ProjectPatch};

/// Repository for the `projects` collection.
pub struct ProjectRepository<'a> {
    store: &'a FirestoreClient,
}

impl<'a> ProjectRepository<'a> {
    /// Create a new project repository.
    #[must_use]
    pub const fn new(store: &'a FirestoreClient) -> Self {
        Self { store }
    }

    /// Create a project. Counters start at zero.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn create(&self, new: &NewProject) -> Result<Project, RepositoryError> {
        let id = Uuid::new_v4().simple().to_string();

        let mut fields = Fields::new();
        fields.insert("ownerUid".to_owned(), Value::string(new.owner_uid.as_str()));
        fields.insert("title".to_owned(), Value::string(&*new.title));
        insert_opt_str(&mut fields, "tagline", new.tagline.as_deref());
        insert_opt_str(&mut fields, "description", new.description.as_deref());
        fields.insert(
            "tech".to_owned(),
            Value::string_array(new.tech.iter().cloned()),
        );
        insert_opt_str(&mut fields, "repoUrl", new.repo_url.as_deref());
        insert_opt_str(&mut fields, "demoUrl", new.demo_url.as_deref());
        if let Some(hid) = &new.hackathon_id {
            fields.insert("hackathonId".to_owned(), Value::string(hid.as_str()));
        }
        fields.insert("views".to_owned(), Value::integer(0));
        fields.insert("likes".to_owned(), Value::integer(0));
        fields.insert("createdAt".to_owned(), Value::timestamp(Utc::now()));

        let doc = self
            .store
            .create_document(collections::PROJECTS, Some(&id), fields)
            .await?;
        from_document(&doc)
    }

    /// Get a project by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn get(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        let doc = self
            .store
            .get_document(collections::PROJECTS, id.as_str())
            .await?;
        doc.map(|d| from_document(&d)).transpose()
    }

    /// All projects owned by a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn list_by_owner(&self, owner: &Uid) -> Result<Vec<Project>, RepositoryError> {
        let docs = self
            .store
            .run_query(
                &Query::collection(collections::PROJECTS)
                    .filter("ownerUid", Op::Equal, Value::string(owner.as_str()))
                    .order_by("createdAt", Direction::Descending),
            )
            .await?;
        docs.iter().map(from_document).collect()
    }

    /// All projects built at a hackathon, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn list_by_hackathon(
        &self,
        hackathon: &HackathonId,
    ) -> Result<Vec<Project>, RepositoryError> {
        let docs = self
            .store
            .run_query(
                &Query::collection(collections::PROJECTS)
                    .filter("hackathonId", Op::Equal, Value::string(hackathon.as_str()))
                    .order_by("createdAt", Direction::Descending),
            )
            .await?;
        docs.iter().map(from_document).collect()
    }

    /// Most recently created projects, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<Project>, RepositoryError> {
        let docs = self
            .store
            .run_query(
                &Query::collection(collections::PROJECTS)
                    .order_by("createdAt", Direction::Descending)
                    .limit(limit),
            )
            .await?;
        docs.iter().map(from_document).collect()
    }

    /// Apply a partial update. Returns `None` for an absent project.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn update(
        &self,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> Result<Option<Project>, RepositoryError> {
        if self.get(id).await?.is_none() {
            return Ok(None);
        }

        let mut fields = Fields::new();
        if let Some(title) = &patch.title {
            fields.insert("title".to_owned(), Value::string(&**title));
        }
        patch_opt_str(&mut fields, "tagline", patch.tagline.as_deref());
        patch_opt_str(&mut fields, "description", patch.description.as_deref());
        patch_opt_str(&mut fields, "repoUrl", patch.repo_url.as_deref());
        patch_opt_str(&mut fields, "demoUrl", patch.demo_url.as_deref());
        if let Some(tech) = &patch.tech {
            fields.insert(
                "tech".to_owned(),
                Value::string_array(tech.iter().cloned()),
            );
        }

        if fields.is_empty() {
            return self.get(id).await;
        }

        let doc = self
            .store
            .patch_document(collections::PROJECTS, id.as_str(), fields)
            .await?;
        from_document(&doc).map(Some)
    }

    /// Delete a project.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn delete(&self, id: &ProjectId) -> Result<(), RepositoryError> {
        self.store
            .delete_document(collections::PROJECTS, id.as_str())
            .await?;
        Ok(())
    }

    /// Increment the view counter.
    ///
    /// Read-then-write on purpose: concurrent viewers can under-count, which
    /// the counters tolerate.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn increment_views(&self, id: &ProjectId) -> Result<(), RepositoryError> {
        self.adjust_counter(id, "views", 1).await
    }

    /// Adjust the like counter by `delta` (clamped at zero).
    ///
    /// Same read-then-write caveat as [`Self::increment_views`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn adjust_likes(&self, id: &ProjectId, delta: i64) -> Result<(), RepositoryError> {
        self.adjust_counter(id, "likes", delta).await
    }

    /// Total number of projects.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(self
            .store
            .count(&Query::collection(collections::PROJECTS))
            .await?)
    }

    async fn adjust_counter(
        &self,
        id: &ProjectId,
        key: &str,
        delta: i64,
    ) -> Result<(), RepositoryError> {
        let Some(doc) = self
            .store
            .get_document(collections::PROJECTS, id.as_str())
            .await?
        else {
            return Ok(());
        };

        let next = (doc.i64_field_or_zero(key) + delta).max(0);
        let mut fields = Fields::new();
        fields.insert(key.to_owned(), Value::integer(next));
        self.store
            .patch_document(collections::PROJECTS, id.as_str(), fields)
            .await?;
        Ok(())
    }
}

fn insert_opt_str(fields: &mut Fields, key: &str, value: Option<&str>) {
    if let Some(v) = value {
        fields.insert(key.to_owned(), Value::string(v));
    }
}

/// `Some("")` clears the field, `Some(s)` overwrites, `None` leaves as-is.
fn patch_opt_str(fields: &mut Fields, key: &str, value: Option<&str>) {
    if let Some(v) = value {
        if v.trim().is_empty() {
            fields.insert(key.to_owned(), Value::null());
        } else {
            fields.insert(key.to_owned(), Value::string(v));
        }
    }
}

fn from_document(doc: &Document) -> Result<Project, RepositoryError> {
    let id = doc.id();
    let owner = doc
        .str_field("ownerUid")
        .ok_or_else(|| corrupt(collections::PROJECTS, id, "ownerUid"))?;
    let title = doc
        .str_field("title")
        .ok_or_else(|| corrupt(collections::PROJECTS, id, "title"))?;

    Ok(Project {
        id: ProjectId::new(id),
        owner_uid: Uid::new(owner),
        title: title.to_owned(),
        tagline: doc.opt_str_field("tagline"),
        description: doc.opt_str_field("description"),
        tech: doc.string_array_field("tech"),
        repo_url: doc.opt_str_field("repoUrl"),
        demo_url: doc.opt_str_field("demoUrl"),
        hackathon_id: doc.opt_str_field("hackathonId").map(HackathonId::new),
        views: doc.i64_field_or_zero("views"),
        likes: doc.i64_field_or_zero("likes"),
        created_at: doc.create_time,
        updated_at: doc.update_time,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_document_defaults_counters() {
        let doc: Document = serde_json::from_value(serde_json::json!({
            "name": "projects/demo/databases/(default)/documents/projects/p1",
            "fields": {
                "ownerUid": {"stringValue": "u1"},
                "title": {"stringValue": "Rustlings Redux"}
            },
            "createTime": "2025-06-01T12:00:00Z",
            "updateTime": "2025-06-01T12:00:00Z"
        }))
        .unwrap();

        let project = from_document(&doc).unwrap();
        assert_eq!(project.views, 0);
        assert_eq!(project.likes, 0);
        assert!(project.hackathon_id.is_none());
    }

    #[test]
    fn test_from_document_missing_title_is_corruption() {
        let doc: Document = serde_json::from_value(serde_json::json!({
            "name": "projects/demo/databases/(default)/documents/projects/p1",
            "fields": {"ownerUid": {"stringValue": "u1"}},
            "createTime": "2025-06-01T12:00:00Z",
            "updateTime": "2025-06-01T12:00:00Z"
        }))
        .unwrap();

        assert!(matches!(
            from_document(&doc),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
