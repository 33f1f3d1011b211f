//! User profile domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use hackdeck_core::{Email, ProfileFacets, SignInMethod, Uid, completeness_score};

/// A stored user profile (domain type).
///
/// Keyed by the authentication identity's id: exactly one profile per
/// identity, created immediately after first registration or first federated
/// sign-in, never speculatively.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    /// Authentication identity id (also the document id).
    pub uid: Uid,
    /// Email at profile creation time.
    pub email: Email,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    /// Self-described role, e.g. "backend engineer".
    pub role: Option<String>,
    pub github_url: Option<String>,
    pub website_url: Option<String>,
    /// Whether this user may create hackathons.
    pub is_host: bool,
    /// Cached linked-method list. The live session provider list is
    /// authoritative at render time; this field can lag after a failed
    /// link/unlink persist.
    pub linked_methods: Vec<SignInMethod>,
    /// Weighted completeness percentage (0-100), recomputed on update.
    pub completeness: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Which scoring-relevant fields are populated.
    #[must_use]
    pub fn facets(&self) -> ProfileFacets {
        ProfileFacets {
            display_name: is_populated(self.display_name.as_deref()),
            bio: is_populated(self.bio.as_deref()),
            skills: !self.skills.is_empty(),
            avatar: is_populated(self.avatar_url.as_deref()),
            location: is_populated(self.location.as_deref()),
            role: is_populated(self.role.as_deref()),
            github: is_populated(self.github_url.as_deref()),
            website: is_populated(self.website_url.as_deref()),
        }
    }

    /// The current completeness score for this profile's fields.
    #[must_use]
    pub fn computed_completeness(&self) -> u8 {
        completeness_score(&self.facets())
    }
}

fn is_populated(field: Option<&str>) -> bool {
    field.is_some_and(|s| !s.trim().is_empty())
}

/// A partial profile update.
///
/// `None` means "leave unchanged"; `Some` overwrites, with empty strings
/// treated as clearing the field.
#[derive(Debug, Clone, Default)]
pub struct UserProfilePatch {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    pub role: Option<String>,
    pub github_url: Option<String>,
    pub website_url: Option<String>,
}

impl UserProfilePatch {
    /// Whether the patch changes anything at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.bio.is_none()
            && self.skills.is_none()
            && self.avatar_url.is_none()
            && self.location.is_none()
            && self.role.is_none()
            && self.github_url.is_none()
            && self.website_url.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            uid: Uid::new("u1"),
            email: Email::parse("u1@example.com").expect("valid email"),
            display_name: Some("Ada".to_owned()),
            bio: None,
            skills: vec!["rust".to_owned()],
            avatar_url: None,
            location: Some("  ".to_owned()),
            role: None,
            github_url: None,
            website_url: None,
            is_host: false,
            linked_methods: vec![SignInMethod::Password],
            completeness: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_facets_treat_blank_as_unpopulated() {
        let facets = profile().facets();
        assert!(facets.display_name);
        assert!(facets.skills);
        assert!(!facets.location);
        assert!(!facets.bio);
    }

    #[test]
    fn test_computed_completeness() {
        // display_name (15) + skills (20)
        assert_eq!(profile().computed_completeness(), 35);
    }

    #[test]
    fn test_empty_patch() {
        assert!(UserProfilePatch::default().is_empty());
        let patch = UserProfilePatch {
            bio: Some("hi".to_owned()),
            ..UserProfilePatch::default()
        };
        assert!(!patch.is_empty());
    }
}
