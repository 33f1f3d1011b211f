//! Hackathon service.

use hackdeck_core::{AchievementKind, HackathonId, NotificationKind, Uid};
use hackdeck_store::db::{
    AchievementRepository, HackathonListFilter, HackathonRepository, NotificationRepository,
    UserRepository,
};
use hackdeck_store::firestore::FirestoreClient;
use hackdeck_store::models::{Hackathon, HackathonPatch, NewHackathon, SavedItemKind};

use crate::error::{AppError, Result};
use crate::services::email::EmailClient;

/// Hackathon listing and hosting operations.
pub struct HackathonService<'a> {
    hackathons: HackathonRepository<'a>,
    users: UserRepository<'a>,
    achievements: AchievementRepository<'a>,
    notifications: NotificationRepository<'a>,
    engagement: hackdeck_store::db::EngagementRepository<'a>,
}

impl<'a> HackathonService<'a> {
    /// Create a new hackathon service.
    #[must_use]
    pub const fn new(store: &'a FirestoreClient) -> Self {
        Self {
            hackathons: HackathonRepository::new(store),
            users: UserRepository::new(store),
            achievements: AchievementRepository::new(store),
            notifications: NotificationRepository::new(store),
            engagement: hackdeck_store::db::EngagementRepository::new(store),
        }
    }

    /// Create a hackathon. Hosts only; the first hosted hackathon awards an
    /// achievement.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` when the caller lacks host privileges.
    pub async fn create(&self, new: &NewHackathon) -> Result<Hackathon> {
        let host = self
            .users
            .get(&new.host_uid)
            .await?
            .ok_or_else(|| AppError::Unauthorized("no profile".to_owned()))?;
        if !host.is_host {
            return Err(AppError::Forbidden(
                "host privileges required to create hackathons".to_owned(),
            ));
        }

        let hackathon = self.hackathons.create(new).await?;

        if self
            .achievements
            .award(&new.host_uid, AchievementKind::FirstHackathonHosted)
            .await?
            .is_some()
        {
            self.notifications
                .create(
                    &new.host_uid,
                    NotificationKind::Achievement,
                    "Achievement unlocked: first hackathon hosted",
                )
                .await?;
        }

        Ok(hackathon)
    }

    /// Get a hackathon by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store call fails.
    pub async fn get(&self, id: &HackathonId) -> Result<Option<Hackathon>> {
        Ok(self.hackathons.get(id).await?)
    }

    /// List hackathons with the standard filter (status equality, start-date
    /// range, sorted by start date).
    ///
    /// # Errors
    ///
    /// Returns an error if the store call fails.
    pub async fn list(&self, filter: &HackathonListFilter) -> Result<Vec<Hackathon>> {
        Ok(self.hackathons.list(filter).await?)
    }

    /// Update a hackathon the caller hosts.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an absent hackathon and
    /// `AppError::Forbidden` for someone else's.
    pub async fn update_own(
        &self,
        host: &Uid,
        id: &HackathonId,
        patch: &HackathonPatch,
    ) -> Result<Hackathon> {
        let hackathon = self
            .hackathons
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("hackathon {id}")))?;
        if hackathon.host_uid != *host {
            return Err(AppError::Forbidden("not your hackathon".to_owned()));
        }

        self.hackathons
            .update(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("hackathon {id}")))
    }

    /// Save a hackathon to the caller's bookmarks. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an absent hackathon.
    pub async fn save(&self, uid: &Uid, id: &HackathonId) -> Result<bool> {
        if self.hackathons.get(id).await?.is_none() {
            return Err(AppError::NotFound(format!("hackathon {id}")));
        }
        Ok(self
            .engagement
            .save(uid, SavedItemKind::Hackathon, id.as_str())
            .await?)
    }

    /// Remove a hackathon bookmark. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store call fails.
    pub async fn unsave(&self, uid: &Uid, id: &HackathonId) -> Result<()> {
        self.engagement.unsave(uid, id.as_str()).await?;
        Ok(())
    }

    /// Request host privileges: email the operators and confirm receipt to
    /// the requester. The email is fire-and-forget; the decision itself is
    /// made in the admin back-office.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Conflict` when the caller is already a host.
    pub async fn request_host(
        &self,
        uid: &Uid,
        message: &str,
        email: &EmailClient,
        admin_notify: Option<&str>,
    ) -> Result<()> {
        let profile = self
            .users
            .get(uid)
            .await?
            .ok_or_else(|| AppError::Unauthorized("no profile".to_owned()))?;
        if profile.is_host {
            return Err(AppError::Conflict("already a host".to_owned()));
        }

        if let Some(to) = admin_notify {
            email.fire_host_request(
                to,
                profile.email.as_str(),
                profile.display_name.as_deref().unwrap_or("(no name)"),
                message,
            );
        }

        self.notifications
            .create(
                uid,
                NotificationKind::HostRequest,
                "Your host request was received and is being reviewed",
            )
            .await?;

        Ok(())
    }
}
