//! User profile repository.

use chrono::Utc;

use hackdeck_core::{Email, SignInMethod, Uid};

use super::{RepositoryError, collections, corrupt};
use crate::firestore::{Direction, Document, Fields, FirestoreClient, Op, Query, StoreError, Value};
use crate::models::user::{UserProfile, UserProfilePatch};

/// Repository for the `users` collection.
pub struct UserRepository<'a> {
    store: &'a FirestoreClient,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(store: &'a FirestoreClient) -> Self {
        Self { store }
    }

    /// Get a profile by identity id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails, or
    /// `DataCorruption` if the stored document is invalid.
    pub async fn get(&self, uid: &Uid) -> Result<Option<UserProfile>, RepositoryError> {
        let doc = self
            .store
            .get_document(collections::USERS, uid.as_str())
            .await?;
        doc.map(|d| from_document(&d)).transpose()
    }

    /// Create the initial profile for a freshly registered identity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a profile already exists for
    /// this identity.
    pub async fn create_initial(
        &self,
        uid: &Uid,
        email: &Email,
        display_name: Option<&str>,
        linked_methods: &[SignInMethod],
    ) -> Result<UserProfile, RepositoryError> {
        let mut fields = Fields::new();
        fields.insert("email".to_owned(), Value::string(email.as_str()));
        if let Some(name) = display_name {
            fields.insert("displayName".to_owned(), Value::string(name));
        }
        fields.insert("skills".to_owned(), Value::string_array::<_, String>([]));
        fields.insert("isHost".to_owned(), Value::boolean(false));
        fields.insert(
            "linkedMethods".to_owned(),
            Value::string_array(linked_methods.iter().map(|m| m.provider_id())),
        );
        // Fresh profile: only the provider-reported display name can count.
        let completeness = hackdeck_core::completeness_score(&hackdeck_core::ProfileFacets {
            display_name: display_name.is_some_and(|n| !n.trim().is_empty()),
            ..hackdeck_core::ProfileFacets::default()
        });
        fields.insert(
            "completeness".to_owned(),
            Value::integer(i64::from(completeness)),
        );
        fields.insert("createdAt".to_owned(), Value::timestamp(Utc::now()));

        let doc = self
            .store
            .create_document(collections::USERS, Some(uid.as_str()), fields)
            .await
            .map_err(|e| match e {
                StoreError::AlreadyExists => {
                    RepositoryError::Conflict("profile already exists".to_owned())
                }
                other => RepositoryError::Store(other),
            })?;

        from_document(&doc)
    }

    /// Apply a partial profile update and refresh the completeness score.
    ///
    /// Returns `None` if no profile exists for the identity. The score is
    /// computed over the merged result, so it always reflects the stored
    /// state after this patch.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn update_profile(
        &self,
        uid: &Uid,
        patch: &UserProfilePatch,
    ) -> Result<Option<UserProfile>, RepositoryError> {
        let Some(mut profile) = self.get(uid).await? else {
            return Ok(None);
        };

        let mut fields = Fields::new();
        apply_opt_str(&mut fields, "displayName", patch.display_name.as_deref(), &mut profile.display_name);
        apply_opt_str(&mut fields, "bio", patch.bio.as_deref(), &mut profile.bio);
        apply_opt_str(&mut fields, "avatarUrl", patch.avatar_url.as_deref(), &mut profile.avatar_url);
        apply_opt_str(&mut fields, "location", patch.location.as_deref(), &mut profile.location);
        apply_opt_str(&mut fields, "role", patch.role.as_deref(), &mut profile.role);
        apply_opt_str(&mut fields, "githubUrl", patch.github_url.as_deref(), &mut profile.github_url);
        apply_opt_str(&mut fields, "websiteUrl", patch.website_url.as_deref(), &mut profile.website_url);
        if let Some(skills) = &patch.skills {
            fields.insert(
                "skills".to_owned(),
                Value::string_array(skills.iter().cloned()),
            );
            profile.skills.clone_from(skills);
        }

        let completeness = profile.computed_completeness();
        fields.insert(
            "completeness".to_owned(),
            Value::integer(i64::from(completeness)),
        );

        let doc = self
            .store
            .patch_document(collections::USERS, uid.as_str(), fields)
            .await?;
        from_document(&doc).map(Some)
    }

    /// Persist the linked-method list after a successful link or unlink.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn set_linked_methods(
        &self,
        uid: &Uid,
        methods: &[SignInMethod],
    ) -> Result<(), RepositoryError> {
        let mut fields = Fields::new();
        fields.insert(
            "linkedMethods".to_owned(),
            Value::string_array(methods.iter().map(|m| m.provider_id())),
        );
        self.store
            .patch_document(collections::USERS, uid.as_str(), fields)
            .await?;
        Ok(())
    }

    /// Grant or revoke host privileges.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn set_host(&self, uid: &Uid, is_host: bool) -> Result<(), RepositoryError> {
        let mut fields = Fields::new();
        fields.insert("isHost".to_owned(), Value::boolean(is_host));
        self.store
            .patch_document(collections::USERS, uid.as_str(), fields)
            .await?;
        Ok(())
    }

    /// Delete a profile document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn delete(&self, uid: &Uid) -> Result<(), RepositoryError> {
        self.store
            .delete_document(collections::USERS, uid.as_str())
            .await?;
        Ok(())
    }

    /// Most recently created profiles, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<UserProfile>, RepositoryError> {
        let docs = self
            .store
            .run_query(
                &Query::collection(collections::USERS)
                    .order_by("createdAt", Direction::Descending)
                    .limit(limit),
            )
            .await?;
        docs.iter().map(from_document).collect()
    }

    /// Total number of profiles.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(self
            .store
            .count(&Query::collection(collections::USERS))
            .await?)
    }

    /// Number of profiles created at or after the given instant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn count_created_since(
        &self,
        since: chrono::DateTime<Utc>,
    ) -> Result<i64, RepositoryError> {
        Ok(self
            .store
            .count(&Query::collection(collections::USERS).filter(
                "createdAt",
                Op::GreaterThanOrEqual,
                Value::timestamp(since),
            ))
            .await?)
    }
}

/// Write a string patch field: `Some("")` clears (writes null), `Some(s)`
/// overwrites, `None` leaves unchanged. Mirrors the change into the
/// in-memory profile so completeness is computed over the merged result.
fn apply_opt_str(
    fields: &mut Fields,
    key: &str,
    patch: Option<&str>,
    current: &mut Option<String>,
) {
    if let Some(value) = patch {
        if value.trim().is_empty() {
            fields.insert(key.to_owned(), Value::null());
            *current = None;
        } else {
            fields.insert(key.to_owned(), Value::string(value));
            *current = Some(value.to_owned());
        }
    }
}

fn from_document(doc: &Document) -> Result<UserProfile, RepositoryError> {
    let id = doc.id();
    let email_str = doc
        .str_field("email")
        .ok_or_else(|| corrupt(collections::USERS, id, "email"))?;
    let email = Email::parse(email_str)
        .map_err(|_| corrupt(collections::USERS, id, "email"))?;

    let linked_methods = doc
        .string_array_field("linkedMethods")
        .iter()
        .filter_map(|s| SignInMethod::parse(s).ok())
        .collect();

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let completeness = doc.i64_field_or_zero("completeness").clamp(0, 100) as u8;

    Ok(UserProfile {
        uid: Uid::new(id),
        email,
        display_name: doc.opt_str_field("displayName"),
        bio: doc.opt_str_field("bio"),
        skills: doc.string_array_field("skills"),
        avatar_url: doc.opt_str_field("avatarUrl"),
        location: doc.opt_str_field("location"),
        role: doc.opt_str_field("role"),
        github_url: doc.opt_str_field("githubUrl"),
        website_url: doc.opt_str_field("websiteUrl"),
        is_host: doc.bool_field_or_false("isHost"),
        linked_methods,
        completeness,
        created_at: doc.create_time,
        updated_at: doc.update_time,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn doc(fields: serde_json::Value) -> Document {
        serde_json::from_value(serde_json::json!({
            "name": "projects/demo/databases/(default)/documents/users/u1",
            "fields": fields,
            "createTime": "2025-06-01T12:00:00Z",
            "updateTime": "2025-06-02T12:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_from_document_full() {
        let doc = doc(serde_json::json!({
            "email": {"stringValue": "ada@example.com"},
            "displayName": {"stringValue": "Ada"},
            "skills": {"arrayValue": {"values": [{"stringValue": "rust"}]}},
            "isHost": {"booleanValue": true},
            "linkedMethods": {"arrayValue": {"values": [
                {"stringValue": "password"},
                {"stringValue": "google.com"}
            ]}},
            "completeness": {"integerValue": "35"}
        }));

        let profile = from_document(&doc).unwrap();
        assert_eq!(profile.uid.as_str(), "u1");
        assert_eq!(profile.email.as_str(), "ada@example.com");
        assert_eq!(profile.skills, vec!["rust"]);
        assert!(profile.is_host);
        assert_eq!(
            profile.linked_methods,
            vec![SignInMethod::Password, SignInMethod::Google]
        );
        assert_eq!(profile.completeness, 35);
    }

    #[test]
    fn test_from_document_missing_email_is_corruption() {
        let doc = doc(serde_json::json!({
            "displayName": {"stringValue": "Ada"}
        }));

        assert!(matches!(
            from_document(&doc),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_unknown_linked_method_is_skipped() {
        let doc = doc(serde_json::json!({
            "email": {"stringValue": "ada@example.com"},
            "linkedMethods": {"arrayValue": {"values": [
                {"stringValue": "password"},
                {"stringValue": "github.com"}
            ]}}
        }));

        let profile = from_document(&doc).unwrap();
        assert_eq!(profile.linked_methods, vec![SignInMethod::Password]);
    }
}
