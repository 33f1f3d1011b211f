//! Hackathon repository.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use hackdeck_core::{HackathonId, HackathonStatus, Uid};

use super::{RepositoryError, collections, corrupt};
use crate::firestore::{Direction, Document, Fields, FirestoreClient, Op, Query, Value};
use crate::models::hackathon::{Hackathon, HackathonMode, HackathonPatch, NewHackathon};

/// Listing filter: status equality plus a start-date range, sorted by start
/// date ascending. Equality and range filters only - that is all the store's
/// query model gives us without composite indexes.
#[derive(Debug, Clone, Default)]
pub struct HackathonListFilter {
    pub status: Option<HackathonStatus>,
    pub starts_after: Option<DateTime<Utc>>,
    pub starts_before: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
}

/// Repository for the `hackathons` collection.
pub struct HackathonRepository<'a> {
    store: &'a FirestoreClient,
}

impl<'a> HackathonRepository<'a> {
    /// Create a new hackathon repository.
    #[must_use]
    pub const fn new(store: &'a FirestoreClient) -> Self {
        Self { store }
    }

    /// Create a hackathon. Starts in `Draft`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn create(&self, new: &NewHackathon) -> Result<Hackathon, RepositoryError> {
        let id = Uuid::new_v4().simple().to_string();

        let mut fields = Fields::new();
        fields.insert("hostUid".to_owned(), Value::string(new.host_uid.as_str()));
        fields.insert("title".to_owned(), Value::string(&*new.title));
        if let Some(description) = &new.description {
            fields.insert("description".to_owned(), Value::string(&**description));
        }
        fields.insert("mode".to_owned(), Value::string(new.mode.as_str()));
        if let Some(location) = &new.location {
            fields.insert("location".to_owned(), Value::string(&**location));
        }
        fields.insert(
            "status".to_owned(),
            Value::string(status_str(HackathonStatus::Draft)),
        );
        fields.insert("startsAt".to_owned(), Value::timestamp(new.starts_at));
        fields.insert("endsAt".to_owned(), Value::timestamp(new.ends_at));
        fields.insert(
            "themes".to_owned(),
            Value::string_array(new.themes.iter().cloned()),
        );
        if let Some(prize_pool) = &new.prize_pool {
            fields.insert("prizePool".to_owned(), Value::string(&**prize_pool));
        }
        fields.insert("featured".to_owned(), Value::boolean(false));
        fields.insert("createdAt".to_owned(), Value::timestamp(Utc::now()));

        let doc = self
            .store
            .create_document(collections::HACKATHONS, Some(&id), fields)
            .await?;
        from_document(&doc)
    }

    /// Get a hackathon by id (through the read cache - listings hit this
    /// hard).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn get(&self, id: &HackathonId) -> Result<Option<Hackathon>, RepositoryError> {
        let doc = self
            .store
            .get_document_cached(collections::HACKATHONS, id.as_str())
            .await?;
        doc.map(|d| from_document(&d)).transpose()
    }

    /// List hackathons matching the filter, sorted by start date ascending.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn list(
        &self,
        filter: &HackathonListFilter,
    ) -> Result<Vec<Hackathon>, RepositoryError> {
        let mut query = Query::collection(collections::HACKATHONS)
            .order_by("startsAt", Direction::Ascending);

        if let Some(status) = filter.status {
            query = query.filter("status", Op::Equal, Value::string(status_str(status)));
        }
        if let Some(after) = filter.starts_after {
            query = query.filter("startsAt", Op::GreaterThanOrEqual, Value::timestamp(after));
        }
        if let Some(before) = filter.starts_before {
            query = query.filter("startsAt", Op::LessThanOrEqual, Value::timestamp(before));
        }
        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }

        let docs = self.store.run_query(&query).await?;
        docs.iter().map(from_document).collect()
    }

    /// All hackathons hosted by a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn list_by_host(&self, host: &Uid) -> Result<Vec<Hackathon>, RepositoryError> {
        let docs = self
            .store
            .run_query(
                &Query::collection(collections::HACKATHONS)
                    .filter("hostUid", Op::Equal, Value::string(host.as_str()))
                    .order_by("createdAt", Direction::Descending),
            )
            .await?;
        docs.iter().map(from_document).collect()
    }

    /// Apply a partial update. Returns `None` for an absent hackathon.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn update(
        &self,
        id: &HackathonId,
        patch: &HackathonPatch,
    ) -> Result<Option<Hackathon>, RepositoryError> {
        if self.get(id).await?.is_none() {
            return Ok(None);
        }

        let mut fields = Fields::new();
        if let Some(title) = &patch.title {
            fields.insert("title".to_owned(), Value::string(&**title));
        }
        if let Some(description) = &patch.description {
            fields.insert("description".to_owned(), Value::string(&**description));
        }
        if let Some(mode) = patch.mode {
            fields.insert("mode".to_owned(), Value::string(mode.as_str()));
        }
        if let Some(location) = &patch.location {
            fields.insert("location".to_owned(), Value::string(&**location));
        }
        if let Some(status) = patch.status {
            fields.insert("status".to_owned(), Value::string(status_str(status)));
        }
        if let Some(starts_at) = patch.starts_at {
            fields.insert("startsAt".to_owned(), Value::timestamp(starts_at));
        }
        if let Some(ends_at) = patch.ends_at {
            fields.insert("endsAt".to_owned(), Value::timestamp(ends_at));
        }
        if let Some(themes) = &patch.themes {
            fields.insert(
                "themes".to_owned(),
                Value::string_array(themes.iter().cloned()),
            );
        }
        if let Some(prize_pool) = &patch.prize_pool {
            fields.insert("prizePool".to_owned(), Value::string(&**prize_pool));
        }

        if fields.is_empty() {
            return self.get(id).await;
        }

        let doc = self
            .store
            .patch_document(collections::HACKATHONS, id.as_str(), fields)
            .await?;
        from_document(&doc).map(Some)
    }

    /// Set the admin-controlled featured flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn set_featured(
        &self,
        id: &HackathonId,
        featured: bool,
    ) -> Result<(), RepositoryError> {
        let mut fields = Fields::new();
        fields.insert("featured".to_owned(), Value::boolean(featured));
        self.store
            .patch_document(collections::HACKATHONS, id.as_str(), fields)
            .await?;
        Ok(())
    }

    /// Delete a hackathon document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn delete(&self, id: &HackathonId) -> Result<(), RepositoryError> {
        self.store
            .delete_document(collections::HACKATHONS, id.as_str())
            .await?;
        Ok(())
    }

    /// Total number of hackathons.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(self
            .store
            .count(&Query::collection(collections::HACKATHONS))
            .await?)
    }
}

const fn status_str(status: HackathonStatus) -> &'static str {
    match status {
        HackathonStatus::Draft => "draft",
        HackathonStatus::Published => "published",
        HackathonStatus::Ongoing => "ongoing",
        HackathonStatus::Completed => "completed",
    }
}

fn parse_status(s: &str) -> Option<HackathonStatus> {
    match s {
        "draft" => Some(HackathonStatus::Draft),
        "published" => Some(HackathonStatus::Published),
        "ongoing" => Some(HackathonStatus::Ongoing),
        "completed" => Some(HackathonStatus::Completed),
        _ => None,
    }
}

fn from_document(doc: &Document) -> Result<Hackathon, RepositoryError> {
    let id = doc.id();
    let host = doc
        .str_field("hostUid")
        .ok_or_else(|| corrupt(collections::HACKATHONS, id, "hostUid"))?;
    let title = doc
        .str_field("title")
        .ok_or_else(|| corrupt(collections::HACKATHONS, id, "title"))?;
    let status = doc
        .str_field("status")
        .and_then(parse_status)
        .ok_or_else(|| corrupt(collections::HACKATHONS, id, "status"))?;
    let mode = doc
        .str_field("mode")
        .and_then(HackathonMode::parse)
        .ok_or_else(|| corrupt(collections::HACKATHONS, id, "mode"))?;
    let starts_at = doc
        .timestamp_field("startsAt")
        .ok_or_else(|| corrupt(collections::HACKATHONS, id, "startsAt"))?;
    let ends_at = doc
        .timestamp_field("endsAt")
        .ok_or_else(|| corrupt(collections::HACKATHONS, id, "endsAt"))?;

    Ok(Hackathon {
        id: HackathonId::new(id),
        host_uid: Uid::new(host),
        title: title.to_owned(),
        description: doc.opt_str_field("description"),
        mode,
        location: doc.opt_str_field("location"),
        status,
        starts_at,
        ends_at,
        themes: doc.string_array_field("themes"),
        prize_pool: doc.opt_str_field("prizePool"),
        featured: doc.bool_field_or_false("featured"),
        created_at: doc.create_time,
        updated_at: doc.update_time,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            HackathonStatus::Draft,
            HackathonStatus::Published,
            HackathonStatus::Ongoing,
            HackathonStatus::Completed,
        ] {
            assert_eq!(parse_status(status_str(status)), Some(status));
        }
    }

    #[test]
    fn test_from_document_bad_status_is_corruption() {
        let doc: Document = serde_json::from_value(serde_json::json!({
            "name": "projects/demo/databases/(default)/documents/hackathons/h1",
            "fields": {
                "hostUid": {"stringValue": "u1"},
                "title": {"stringValue": "RustConf Hack Night"},
                "status": {"stringValue": "cancelled"},
                "mode": {"stringValue": "online"},
                "startsAt": {"timestampValue": "2025-07-01T09:00:00Z"},
                "endsAt": {"timestampValue": "2025-07-02T18:00:00Z"}
            },
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
