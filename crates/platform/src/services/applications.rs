//! Application service.

use hackdeck_core::{
    AchievementKind, ApplicationId, ApplicationStatus, HackathonId, NotificationKind, Uid,
};
use hackdeck_store::db::{
    AchievementRepository, ApplicationRepository, HackathonRepository, NotificationRepository,
    UserRepository,
};
use hackdeck_store::firestore::FirestoreClient;
use hackdeck_store::models::{Application, NewApplication};

use crate::error::{AppError, Result};
use crate::services::email::EmailClient;

/// Hackathon application operations.
pub struct ApplicationService<'a> {
    applications: ApplicationRepository<'a>,
    hackathons: HackathonRepository<'a>,
    users: UserRepository<'a>,
    achievements: AchievementRepository<'a>,
    notifications: NotificationRepository<'a>,
}

impl<'a> ApplicationService<'a> {
    /// Create a new application service.
    #[must_use]
    pub const fn new(store: &'a FirestoreClient) -> Self {
        Self {
            applications: ApplicationRepository::new(store),
            hackathons: HackathonRepository::new(store),
            users: UserRepository::new(store),
            achievements: AchievementRepository::new(store),
            notifications: NotificationRepository::new(store),
        }
    }

    /// Apply to a hackathon. Sends the confirmation email fire-and-forget;
    /// the first application awards an achievement.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an absent hackathon, `BadRequest`
    /// when it isn't accepting applications, `Conflict` for a duplicate
    /// application.
    pub async fn apply(
        &self,
        uid: &Uid,
        hackathon_id: &HackathonId,
        motivation: Option<String>,
        team_name: Option<String>,
        email: &EmailClient,
    ) -> Result<Application> {
        let hackathon = self
            .hackathons
            .get(hackathon_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("hackathon {hackathon_id}")))?;
        if !hackathon.status.accepts_applications() {
            return Err(AppError::BadRequest(
                "this hackathon is not accepting applications".to_owned(),
            ));
        }

        let application = self
            .applications
            .create(&NewApplication {
                hackathon_id: hackathon_id.clone(),
                applicant_uid: uid.clone(),
                motivation,
                team_name,
            })
            .await
            .map_err(|e| match e {
                hackdeck_store::db::RepositoryError::Conflict(msg) => AppError::Conflict(msg),
                other => AppError::Repository(other),
            })?;

        if let Ok(Some(profile)) = self.users.get(uid).await {
            email.fire_application_confirmation(
                profile.email.as_str(),
                profile.display_name.as_deref().unwrap_or("there"),
                &hackathon.title,
            );
        }

        if self
            .achievements
            .award(uid, AchievementKind::FirstApplication)
            .await?
            .is_some()
        {
            self.notifications
                .create(
                    uid,
                    NotificationKind::Achievement,
                    "Achievement unlocked: first hackathon application",
                )
                .await?;
        }

        Ok(application)
    }

    /// The caller's applications.
    ///
    /// # Errors
    ///
    /// Returns an error if the store call fails.
    pub async fn list_mine(&self, uid: &Uid) -> Result<Vec<Application>> {
        Ok(self.applications.list_by_applicant(uid).await?)
    }

    /// Applications for a hackathon; hosts only.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` when the caller doesn't host the
    /// hackathon.
    pub async fn list_for_hackathon(
        &self,
        caller: &Uid,
        hackathon_id: &HackathonId,
    ) -> Result<Vec<Application>> {
        let hackathon = self
            .hackathons
            .get(hackathon_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("hackathon {hackathon_id}")))?;
        if hackathon.host_uid != *caller {
            return Err(AppError::Forbidden("not your hackathon".to_owned()));
        }

        Ok(self.applications.list_by_hackathon(hackathon_id).await?)
    }

    /// Move an application to a new review status. Only the hackathon host
    /// may decide; the applicant may only withdraw (see
    /// [`Self::withdraw`]). Invalid transitions are rejected before any
    /// write.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Conflict` for an invalid transition and
    /// `Forbidden` for a non-host caller.
    pub async fn transition(
        &self,
        caller: &Uid,
        id: &ApplicationId,
        next: ApplicationStatus,
    ) -> Result<Application> {
        let application = self
            .applications
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("application {id}")))?;
        let hackathon = self
            .hackathons
            .get(&application.hackathon_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("hackathon {}", application.hackathon_id))
            })?;

        let is_host = hackathon.host_uid == *caller;
        let is_applicant_withdrawal =
            application.applicant_uid == *caller && next == ApplicationStatus::Withdrawn;
        if !is_host && !is_applicant_withdrawal {
            return Err(AppError::Forbidden(
                "only the hackathon host can review applications".to_owned(),
            ));
        }

        if !application.status.can_transition_to(next) {
            return Err(AppError::Conflict(format!(
                "cannot move application from {} to {next}",
                application.status
            )));
        }

        let updated = self
            .applications
            .set_status(id, next)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("application {id}")))?;

        if is_host {
            self.notifications
                .create(
                    &application.applicant_uid,
                    NotificationKind::ApplicationUpdate,
                    &format!(
                        "Your application to \"{}\" is now {next}",
                        hackathon.title
                    ),
                )
                .await?;
        }

        Ok(updated)
    }

    /// Withdraw the caller's own application.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` for someone else's application or
    /// `Conflict` when already terminal.
    pub async fn withdraw(&self, uid: &Uid, id: &ApplicationId) -> Result<Application> {
        let application = self
            .applications
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("application {id}")))?;
        if application.applicant_uid != *uid {
            return Err(AppError::Forbidden("not your application".to_owned()));
        }

        self.transition(uid, id, ApplicationStatus::Withdrawn).await
    }
}
