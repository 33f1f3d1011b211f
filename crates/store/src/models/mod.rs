//! Domain records.
//!
//! These types represent validated domain objects separate from the wire
//! document shape. Conversion happens in the repository layer; required
//! fields that are missing or mistyped surface there as data corruption.

pub mod achievement;
pub mod application;
pub mod engagement;
pub mod hackathon;
pub mod notification;
pub mod project;
pub mod user;

pub use achievement::Achievement;
pub use application::{Application, NewApplication};
pub use engagement::{LikedItem, SavedItem, SavedItemKind};
pub use hackathon::{Hackathon, HackathonMode, HackathonPatch, NewHackathon};
pub use notification::Notification;
pub use project::{NewProject, Project, ProjectPatch};
pub use user::{UserProfile, UserProfilePatch};
