//! Project service.

use hackdeck_core::{AchievementKind, NotificationKind, ProjectId, Uid};
use hackdeck_store::db::{
    AchievementRepository, EngagementRepository, NotificationRepository, ProjectRepository,
};
use hackdeck_store::firestore::FirestoreClient;
use hackdeck_store::models::{NewProject, Project, ProjectPatch, SavedItemKind};

use crate::error::{AppError, Result};

/// Project showcase operations.
pub struct ProjectService<'a> {
    projects: ProjectRepository<'a>,
    engagement: EngagementRepository<'a>,
    achievements: AchievementRepository<'a>,
    notifications: NotificationRepository<'a>,
}

impl<'a> ProjectService<'a> {
    /// Create a new project service.
    #[must_use]
    pub const fn new(store: &'a FirestoreClient) -> Self {
        Self {
            projects: ProjectRepository::new(store),
            engagement: EngagementRepository::new(store),
            achievements: AchievementRepository::new(store),
            notifications: NotificationRepository::new(store),
        }
    }

    /// Create a project; the owner's first project awards an achievement.
    ///
    /// # Errors
    ///
    /// Returns an error if the store call fails.
    pub async fn create(&self, new: &NewProject) -> Result<Project> {
        let project = self.projects.create(new).await?;

        if self
            .achievements
            .award(&new.owner_uid, AchievementKind::FirstProject)
            .await?
            .is_some()
        {
            self.notifications
                .create(
                    &new.owner_uid,
                    NotificationKind::Achievement,
                    "Achievement unlocked: first project published",
                )
                .await?;
        }

        Ok(project)
    }

    /// Get a project and count the view.
    ///
    /// The counter bump is read-then-write; concurrent viewers can
    /// under-count. Accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if the store call fails.
    pub async fn get_counting_view(&self, id: &ProjectId) -> Result<Option<Project>> {
        let Some(mut project) = self.projects.get(id).await? else {
            return Ok(None);
        };

        self.projects.increment_views(id).await?;
        project.views += 1;
        Ok(Some(project))
    }

    /// Most recent projects.
    ///
    /// # Errors
    ///
    /// Returns an error if the store call fails.
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<Project>> {
        Ok(self.projects.list_recent(limit).await?)
    }

    /// Projects owned by a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the store call fails.
    pub async fn list_by_owner(&self, owner: &Uid) -> Result<Vec<Project>> {
        Ok(self.projects.list_by_owner(owner).await?)
    }

    /// Projects built at a hackathon.
    ///
    /// # Errors
    ///
    /// Returns an error if the store call fails.
    pub async fn list_by_hackathon(
        &self,
        hackathon: &hackdeck_core::HackathonId,
    ) -> Result<Vec<Project>> {
        Ok(self.projects.list_by_hackathon(hackathon).await?)
    }

    /// Update a project the caller owns.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an absent project and
    /// `AppError::Forbidden` for someone else's.
    pub async fn update_own(
        &self,
        owner: &Uid,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> Result<Project> {
        let project = self
            .projects
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("project {id}")))?;
        if project.owner_uid != *owner {
            return Err(AppError::Forbidden("not your project".to_owned()));
        }

        self.projects
            .update(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("project {id}")))
    }

    /// Delete a project the caller owns.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound`/`Forbidden` as for updates.
    pub async fn delete_own(&self, owner: &Uid, id: &ProjectId) -> Result<()> {
        let project = self
            .projects
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("project {id}")))?;
        if project.owner_uid != *owner {
            return Err(AppError::Forbidden("not your project".to_owned()));
        }

        self.projects.delete(id).await?;
        Ok(())
    }

    /// Like a project. Idempotent: returns the (possibly unchanged) like
    /// count delta applied.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an absent project.
    pub async fn like(&self, uid: &Uid, id: &ProjectId) -> Result<bool> {
        let project = self
            .projects
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("project {id}")))?;

        let newly_liked = self.engagement.like(uid, id).await?;
        if newly_liked {
            self.projects.adjust_likes(id, 1).await?;
            if project.owner_uid != *uid {
                self.notifications
                    .create(
                        &project.owner_uid,
                        NotificationKind::ProjectLike,
                        &format!("Someone liked your project \"{}\"", project.title),
                    )
                    .await?;
            }
        }
        Ok(newly_liked)
    }

    /// Remove a like. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store call fails.
    pub async fn unlike(&self, uid: &Uid, id: &ProjectId) -> Result<bool> {
        let removed = self.engagement.unlike(uid, id).await?;
        if removed {
            self.projects.adjust_likes(id, -1).await?;
        }
        Ok(removed)
    }

    /// Save a project to the caller's bookmarks. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an absent project.
    pub async fn save(&self, uid: &Uid, id: &ProjectId) -> Result<bool> {
        if self.projects.get(id).await?.is_none() {
            return Err(AppError::NotFound(format!("project {id}")));
        }
        Ok(self
            .engagement
            .save(uid, SavedItemKind::Project, id.as_str())
            .await?)
    }

    /// Remove a project bookmark. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store call fails.
    pub async fn unsave(&self, uid: &Uid, id: &ProjectId) -> Result<()> {
        self.engagement.unsave(uid, id.as_str()).await?;
        Ok(())
    }
}
