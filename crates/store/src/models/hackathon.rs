//! Hackathon listing domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hackdeck_core::{HackathonId, HackathonStatus, Uid};

/// How a hackathon is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HackathonMode {
    #[default]
    Online,
    InPerson,
    Hybrid,
}

impl HackathonMode {
    /// Wire string for document fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::InPerson => "in_person",
            Self::Hybrid => "hybrid",
        }
    }

    /// Parse the wire string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "online" => Some(Self::Online),
            "in_person" => Some(Self::InPerson),
            "hybrid" => Some(Self::Hybrid),
            _ => None,
        }
    }
}

/// A hackathon listing.
#[derive(Debug, Clone, Serialize)]
pub struct Hackathon {
    pub id: HackathonId,
    pub host_uid: Uid,
    pub title: String,
    pub description: Option<String>,
    pub mode: HackathonMode,
    /// Physical location for in-person/hybrid events.
    pub location: Option<String>,
    pub status: HackathonStatus,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub themes: Vec<String>,
    pub prize_pool: Option<String>,
    /// Highlighted in listings; set from the admin back-office.
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a new hackathon. Starts in `Draft`.
#[derive(Debug, Clone)]
pub struct NewHackathon {
    pub host_uid: Uid,
    pub title: String,
    pub description: Option<String>,
    pub mode: HackathonMode,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub themes: Vec<String>,
    pub prize_pool: Option<String>,
}

/// A partial hackathon update.
#[derive(Debug, Clone, Default)]
pub struct HackathonPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub mode: Option<HackathonMode>,
    pub location: Option<String>,
    pub status: Option<HackathonStatus>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub themes: Option<Vec<String>>,
    pub prize_pool: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_roundtrip() {
        for mode in [
            HackathonMode::Online,
            HackathonMode::InPerson,
            HackathonMode::Hybrid,
        ] {
            assert_eq!(HackathonMode::parse(mode.as_str()), Some(mode));
        }
        assert_eq!(HackathonMode::parse("metaverse"), None);
    }
}
