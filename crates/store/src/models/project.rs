//! Project showcase domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use hackdeck_core::{HackathonId, ProjectId, Uid};

/// A showcased project.
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: ProjectId,
    pub owner_uid: Uid,
    pub title: String,
    pub tagline: Option<String>,
    pub description: Option<String>,
    /// Technologies used, free-form tags.
    pub tech: Vec<String>,
    pub repo_url: Option<String>,
    pub demo_url: Option<String>,
    /// The hackathon this project was built at, if any.
    pub hackathon_id: Option<HackathonId>,
    /// View counter. Incremented read-then-write; can under-count under
    /// concurrent access.
    pub views: i64,
    /// Like counter, same caveat as `views`.
    pub likes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a new project. Counters start at zero.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub owner_uid: Uid,
    pub title: String,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub tech: Vec<String>,
    pub repo_url: Option<String>,
    pub demo_url: Option<String>,
    pub hackathon_id: Option<HackathonId>,
}

/// A partial project update.
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub tech: Option<Vec<String>>,
    pub repo_url: Option<String>,
    pub demo_url: Option<String>,
}
