//! Repositories over the document store.
//!
//! # Collections
//!
//! - `users` - One profile per authentication identity, keyed by its id
//! - `projects` - Project showcases with view/like counters
//! - `hackathons` - Hackathon listings
//! - `applications` - Hackathon applications, keyed `{hackathonId}_{uid}`
//! - `notifications` - Per-user notifications
//! - `achievements` - Awarded achievements, keyed `{uid}_{kind}`
//! - `saved_items` / `liked_items` - Join-style engagement records with
//!   deterministic ids (`{uid}_{itemId}`)
//!
//! Every collection carries `createdAt` as an indexable field (range
//! queries, fixed sort keys); the authoritative `createdAt`/`updatedAt`
//! exposed on records come from the store's server-maintained document
//! timestamps.
//!
//! Each repository converts wire documents into validated domain records;
//! documents that are missing required fields surface as
//! [`RepositoryError::DataCorruption`].

pub mod achievements;
pub mod applications;
pub mod engagement;
pub mod hackathons;
pub mod notifications;
pub mod projects;
pub mod users;

pub use achievements::AchievementRepository;
pub use applications::ApplicationRepository;
pub use engagement::EngagementRepository;
pub use hackathons::{HackathonListFilter, HackathonRepository};
pub use notifications::NotificationRepository;
pub use projects::ProjectRepository;
pub use users::UserRepository;

use thiserror::Error;

use crate::firestore::StoreError;

/// Collection names.
pub mod collections {
    pub const USERS: &str = "users";
    pub const PROJECTS: &str = "projects";
    pub const HACKATHONS: &str = "hackathons";
    pub const APPLICATIONS: &str = "applications";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const ACHIEVEMENTS: &str = "achievements";
    pub const SAVED_ITEMS: &str = "saved_items";
    pub const LIKED_ITEMS: &str = "liked_items";
}

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Document store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A stored document is missing required fields or has wrong types.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g. a record that must be unique already
    /// exists).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Build a `DataCorruption` error for a missing/mistyped required field.
pub(crate) fn corrupt(collection: &str, id: &str, field: &str) -> RepositoryError {
    RepositoryError::DataCorruption(format!(
        "{collection}/{id}: missing or invalid field `{field}`"
    ))
}
