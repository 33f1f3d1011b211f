//! Dashboard analytics aggregation.
//!
//! Straight-line COUNT aggregations over the collections - there is no
//! reporting engine behind this, just one query per figure.

use chrono::{Duration, Utc};
use serde::Serialize;

use hackdeck_core::ApplicationStatus;
use hackdeck_store::db::{
    ApplicationRepository, HackathonRepository, ProjectRepository, UserRepository,
};
use hackdeck_store::firestore::FirestoreClient;

use crate::error::Result;

/// Collection counts and signup trend for the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub users: i64,
    pub projects: i64,
    pub hackathons: i64,
    pub applications: i64,
    /// Profiles created in the last 30 days.
    pub signups_last_30_days: i64,
    pub applications_by_status: ApplicationsByStatus,
}

/// Application counts grouped by review status.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationsByStatus {
    pub submitted: i64,
    pub under_review: i64,
    pub accepted: i64,
    pub rejected: i64,
    pub waitlisted: i64,
    pub withdrawn: i64,
}

/// Analytics aggregation over the document store.
pub struct AnalyticsService<'a> {
    store: &'a FirestoreClient,
}

impl<'a> AnalyticsService<'a> {
    /// Create a new analytics service.
    #[must_use]
    pub const fn new(store: &'a FirestoreClient) -> Self {
        Self { store }
    }

    /// Gather the dashboard figures.
    ///
    /// # Errors
    ///
    /// Returns an error if any aggregation fails.
    pub async fn dashboard(&self) -> Result<DashboardStats> {
        let users = UserRepository::new(self.store);
        let applications = ApplicationRepository::new(self.store);

        let thirty_days_ago = Utc::now() - Duration::days(30);

        Ok(DashboardStats {
            users: users.count().await?,
            projects: ProjectRepository::new(self.store).count().await?,
            hackathons: HackathonRepository::new(self.store).count().await?,
            applications: applications.count().await?,
            signups_last_30_days: users.count_created_since(thirty_days_ago).await?,
            applications_by_status: ApplicationsByStatus {
                submitted: applications
                    .count_with_status(ApplicationStatus::Submitted)
                    .await?,
                under_review: applications
                    .count_with_status(ApplicationStatus::UnderReview)
                    .await?,
                accepted: applications
                    .count_with_status(ApplicationStatus::Accepted)
                    .await?,
                rejected: applications
                    .count_with_status(ApplicationStatus::Rejected)
                    .await?,
                waitlisted: applications
                    .count_with_status(ApplicationStatus::Waitlisted)
                    .await?,
                withdrawn: applications
                    .count_with_status(ApplicationStatus::Withdrawn)
                    .await?,
            },
        })
    }
}
