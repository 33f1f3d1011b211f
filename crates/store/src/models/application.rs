//! Hackathon application domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use hackdeck_core::{ApplicationId, ApplicationStatus, HackathonId, Uid};

/// An application to participate in a hackathon.
#[derive(Debug, Clone, Serialize)]
pub struct Application {
    pub id: ApplicationId,
    pub hackathon_id: HackathonId,
    pub applicant_uid: Uid,
    pub status: ApplicationStatus,
    /// Free-form motivation answer.
    pub motivation: Option<String>,
    pub team_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a new application. Starts in `Submitted`.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub hackathon_id: HackathonId,
    pub applicant_uid: Uid,
    pub motivation: Option<String>,
    pub team_name: Option<String>,
}
