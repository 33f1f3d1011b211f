//! Saved/liked join records.
//!
//! Both collections use deterministic document ids (`{uid}_{itemId}`), which
//! turns save/like into idempotent toggles: creating an existing id is a
//! conflict (already saved), deleting an absent id is a no-op.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hackdeck_core::{ProjectId, Uid};

/// What kind of item a saved record points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavedItemKind {
    Project,
    Hackathon,
}

impl SavedItemKind {
    /// Wire string for document fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Hackathon => "hackathon",
        }
    }

    /// Parse the wire string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "project" => Some(Self::Project),
            "hackathon" => Some(Self::Hackathon),
            _ => None,
        }
    }
}

/// A user's saved (bookmarked) item.
#[derive(Debug, Clone, Serialize)]
pub struct SavedItem {
    pub uid: Uid,
    pub kind: SavedItemKind,
    pub item_id: String,
    pub created_at: DateTime<Utc>,
}

/// A user's like on a project.
#[derive(Debug, Clone, Serialize)]
pub struct LikedItem {
    pub uid: Uid,
    pub project_id: ProjectId,
    pub created_at: DateTime<Utc>,
}
