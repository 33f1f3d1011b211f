//! Profile service.

use hackdeck_core::{AchievementKind, NotificationKind, Uid};
use hackdeck_store::db::{AchievementRepository, NotificationRepository, UserRepository};
use hackdeck_store::firestore::FirestoreClient;
use hackdeck_store::models::{UserProfile, UserProfilePatch};

use crate::error::Result;

/// Profile read/update operations.
pub struct ProfileService<'a> {
    users: UserRepository<'a>,
    achievements: AchievementRepository<'a>,
    notifications: NotificationRepository<'a>,
}

impl<'a> ProfileService<'a> {
    /// Create a new profile service.
    #[must_use]
    pub const fn new(store: &'a FirestoreClient) -> Self {
        Self {
            users: UserRepository::new(store),
            achievements: AchievementRepository::new(store),
            notifications: NotificationRepository::new(store),
        }
    }

    /// Get a profile by identity id. Absent profiles are a valid empty
    /// state.
    ///
    /// # Errors
    ///
    /// Returns an error if the store call fails.
    pub async fn get(&self, uid: &Uid) -> Result<Option<UserProfile>> {
        Ok(self.users.get(uid).await?)
    }

    /// Apply a partial profile update. The completeness score is recomputed
    /// over the merged result; reaching 100% awards the profile-complete
    /// achievement once.
    ///
    /// # Errors
    ///
    /// Returns an error if the store call fails.
    pub async fn update(
        &self,
        uid: &Uid,
        patch: &UserProfilePatch,
    ) -> Result<Option<UserProfile>> {
        let Some(profile) = self.users.update_profile(uid, patch).await? else {
            return Ok(None);
        };

        if profile.completeness == 100
            && let Some(_awarded) = self
                .achievements
                .award(uid, AchievementKind::ProfileComplete)
                .await?
        {
            self.notifications
                .create(
                    uid,
                    NotificationKind::Achievement,
                    "Achievement unlocked: profile 100% complete",
                )
                .await?;
        }

        Ok(Some(profile))
    }
}
