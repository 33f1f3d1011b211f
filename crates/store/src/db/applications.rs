//! Application repository.
//!
//! Document ids are `{hackathonId}_{uid}`, so an applicant can hold at most
//! one application per hackathon; a second submission is a conflict at the
//! store, not a silent duplicate.

use chrono::Utc;

use hackdeck_core::{ApplicationId, ApplicationStatus, HackathonId, Uid};

use super::{RepositoryError, collections, corrupt};
use crate::firestore::{Direction, Document, Fields, FirestoreClient, Op, Query, StoreError, Value};
use crate::models::application::{Application, NewApplication};

/// Repository for the `applications` collection.
pub struct ApplicationRepository<'a> {
    store: &'a FirestoreClient,
}

impl<'a> ApplicationRepository<'a> {
    /// Create a new application repository.
    #[must_use]
    pub const fn new(store: &'a FirestoreClient) -> Self {
        Self { store }
    }

    /// The deterministic document id for an applicant/hackathon pair.
    #[must_use]
    pub fn document_id(hackathon: &HackathonId, applicant: &Uid) -> String {
        format!("{}_{}", hackathon.as_str(), applicant.as_str())
    }

    /// Submit an application. Starts in `Submitted`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the applicant already applied
    /// to this hackathon.
    pub async fn create(&self, new: &NewApplication) -> Result<Application, RepositoryError> {
        let id = Self::document_id(&new.hackathon_id, &new.applicant_uid);

        let mut fields = Fields::new();
        fields.insert(
            "hackathonId".to_owned(),
            Value::string(new.hackathon_id.as_str()),
        );
        fields.insert(
            "applicantUid".to_owned(),
            Value::string(new.applicant_uid.as_str()),
        );
        fields.insert(
            "status".to_owned(),
            Value::string(status_str(ApplicationStatus::Submitted)),
        );
        if let Some(motivation) = &new.motivation {
            fields.insert("motivation".to_owned(), Value::string(&**motivation));
        }
        if let Some(team_name) = &new.team_name {
            fields.insert("teamName".to_owned(), Value::string(&**team_name));
        }
        fields.insert("createdAt".to_owned(), Value::timestamp(Utc::now()));

        let doc = self
            .store
            .create_document(collections::APPLICATIONS, Some(&id), fields)
            .await
            .map_err(|e| match e {
                StoreError::AlreadyExists => {
                    RepositoryError::Conflict("already applied to this hackathon".to_owned())
                }
                other => RepositoryError::Store(other),
            })?;

        from_document(&doc)
    }

    /// Get an application by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn get(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let doc = self
            .store
            .get_document(collections::APPLICATIONS, id.as_str())
            .await?;
        doc.map(|d| from_document(&d)).transpose()
    }

    /// All applications submitted by a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn list_by_applicant(
        &self,
        applicant: &Uid,
    ) -> Result<Vec<Application>, RepositoryError> {
        let docs = self
            .store
            .run_query(
                &Query::collection(collections::APPLICATIONS)
                    .filter("applicantUid", Op::Equal, Value::string(applicant.as_str()))
                    .order_by("createdAt", Direction::Descending),
            )
            .await?;
        docs.iter().map(from_document).collect()
    }

    /// All applications for a hackathon, oldest first (review order).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn list_by_hackathon(
        &self,
        hackathon: &HackathonId,
    ) -> Result<Vec<Application>, RepositoryError> {
        let docs = self
            .store
            .run_query(
                &Query::collection(collections::APPLICATIONS)
                    .filter("hackathonId", Op::Equal, Value::string(hackathon.as_str()))
                    .order_by("createdAt", Direction::Ascending),
            )
            .await?;
        docs.iter().map(from_document).collect()
    }

    /// Overwrite the status field. Transition validity is the service
    /// layer's concern.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn set_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Option<Application>, RepositoryError> {
        if self.get(id).await?.is_none() {
            return Ok(None);
        }

        let mut fields = Fields::new();
        fields.insert("status".to_owned(), Value::string(status_str(status)));
        let doc = self
            .store
            .patch_document(collections::APPLICATIONS, id.as_str(), fields)
            .await?;
        from_document(&doc).map(Some)
    }

    /// Delete an application document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn delete(&self, id: &ApplicationId) -> Result<(), RepositoryError> {
        self.store
            .delete_document(collections::APPLICATIONS, id.as_str())
            .await?;
        Ok(())
    }

    /// Total number of applications.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(self
            .store
            .count(&Query::collection(collections::APPLICATIONS))
            .await?)
    }

    /// Number of applications currently in the given status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn count_with_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<i64, RepositoryError> {
        Ok(self
            .store
            .count(&Query::collection(collections::APPLICATIONS).filter(
                "status",
                Op::Equal,
                Value::string(status_str(status)),
            ))
            .await?)
    }
}

const fn status_str(status: ApplicationStatus) -> &'static str {
    match status {
        ApplicationStatus::Submitted => "submitted",
        ApplicationStatus::UnderReview => "under_review",
        ApplicationStatus::Accepted => "accepted",
        ApplicationStatus::Rejected => "rejected",
        ApplicationStatus::Waitlisted => "waitlisted",
        ApplicationStatus::Withdrawn => "withdrawn",
    }
}

fn parse_status(s: &str) -> Option<ApplicationStatus> {
    match s {
        "submitted" => Some(ApplicationStatus::Submitted),
        "under_review" => Some(ApplicationStatus::UnderReview),
        "accepted" => Some(ApplicationStatus::Accepted),
        "rejected" => Some(ApplicationStatus::Rejected),
        "waitlisted" => Some(ApplicationStatus::Waitlisted),
        "withdrawn" => Some(ApplicationStatus::Withdrawn),
        _ => None,
    }
}

fn from_document(doc: &Document) -> Result<Application, RepositoryError> {
    let id = doc.id();
    let hackathon = doc
        .str_field("hackathonId")
        .ok_or_else(|| corrupt(collections::APPLICATIONS, id, "hackathonId"))?;
    let applicant = doc
        .str_field("applicantUid")
        .ok_or_else(|| corrupt(collections::APPLICATIONS, id, "applicantUid"))?;
    let status = doc
        .str_field("status")
        .and_then(parse_status)
        .ok_or_else(|| corrupt(collections::APPLICATIONS, id, "status"))?;

    Ok(Application {
        id: ApplicationId::new(id),
        hackathon_id: HackathonId::new(hackathon),
        applicant_uid: Uid::new(applicant),
        status,
        motivation: doc.opt_str_field("motivation"),
        team_name: doc.opt_str_field("teamName"),
        created_at: doc.create_time,
        updated_at: doc.update_time,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_is_deterministic() {
        let id = ApplicationRepository::document_id(&HackathonId::new("h1"), &Uid::new("u1"));
        assert_eq!(id, "h1_u1");
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            ApplicationStatus::Submitted,
            ApplicationStatus::UnderReview,
            ApplicationStatus::Accepted,
            ApplicationStatus::Rejected,
            ApplicationStatus::Waitlisted,
            ApplicationStatus::Withdrawn,
        ] {
            assert_eq!(parse_status(status_str(status)), Some(status));
        }
    }
}
