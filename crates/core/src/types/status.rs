//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Hackathon lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HackathonStatus {
    /// Created by a host but not yet visible in listings.
    #[default]
    Draft,
    /// Visible in listings and accepting applications.
    Published,
    /// Event currently running.
    Ongoing,
    /// Event finished.
    Completed,
}

impl HackathonStatus {
    /// Whether applications are accepted in this status.
    #[must_use]
    pub const fn accepts_applications(self) -> bool {
        matches!(self, Self::Published)
    }
}

/// Application review status.
///
/// Reviewers move an application `submitted → under_review` and then to one
/// of the decided states. An applicant can withdraw from any non-terminal
/// state. Decided and withdrawn states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Submitted,
    UnderReview,
    Accepted,
    Rejected,
    Waitlisted,
    Withdrawn,
}

impl ApplicationStatus {
    /// Whether this status is terminal (no further transitions).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected | Self::Withdrawn)
    }

    /// Whether a transition from `self` to `next` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        match self {
            Self::Submitted => matches!(next, Self::UnderReview | Self::Withdrawn),
            Self::UnderReview => matches!(
                next,
                Self::Accepted | Self::Rejected | Self::Waitlisted | Self::Withdrawn
            ),
            // Waitlisted applications can still be decided or withdrawn.
            Self::Waitlisted => {
                matches!(next, Self::Accepted | Self::Rejected | Self::Withdrawn)
            }
            Self::Accepted | Self::Rejected | Self::Withdrawn => false,
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Submitted => "submitted",
            Self::UnderReview => "under_review",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Waitlisted => "waitlisted",
            Self::Withdrawn => "withdrawn",
        };
        write!(f, "{s}")
    }
}

/// Notification categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// An application's status changed.
    ApplicationUpdate,
    /// Someone liked a project.
    ProjectLike,
    /// An achievement was awarded.
    Achievement,
    /// A user requested host privileges (admin-facing).
    HostRequest,
    /// Platform announcement.
    System,
}

/// Achievement categories. Each kind is awarded at most once per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementKind {
    FirstProject,
    FirstApplication,
    ProfileComplete,
    FirstHackathonHosted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submitted_transitions() {
        let s = ApplicationStatus::Submitted;
        assert!(s.can_transition_to(ApplicationStatus::UnderReview));
        assert!(s.can_transition_to(ApplicationStatus::Withdrawn));
        assert!(!s.can_transition_to(ApplicationStatus::Accepted));
        assert!(!s.can_transition_to(ApplicationStatus::Rejected));
    }

    #[test]
    fn test_under_review_transitions() {
        let s = ApplicationStatus::UnderReview;
        assert!(s.can_transition_to(ApplicationStatus::Accepted));
        assert!(s.can_transition_to(ApplicationStatus::Rejected));
        assert!(s.can_transition_to(ApplicationStatus::Waitlisted));
        assert!(s.can_transition_to(ApplicationStatus::Withdrawn));
        assert!(!s.can_transition_to(ApplicationStatus::Submitted));
    }

    #[test]
    fn test_waitlisted_can_still_be_decided() {
        let s = ApplicationStatus::Waitlisted;
        assert!(s.can_transition_to(ApplicationStatus::Accepted));
        assert!(s.can_transition_to(ApplicationStatus::Rejected));
        assert!(!s.can_transition_to(ApplicationStatus::UnderReview));
    }

    #[test]
    fn test_terminal_states_have_no_transitions() {
        for terminal in [
            ApplicationStatus::Accepted,
            ApplicationStatus::Rejected,
            ApplicationStatus::Withdrawn,
        ] {
            assert!(terminal.is_terminal());
            for next in [
                ApplicationStatus::Submitted,
                ApplicationStatus::UnderReview,
                ApplicationStatus::Accepted,
                ApplicationStatus::Rejected,
                ApplicationStatus::Waitlisted,
                ApplicationStatus::Withdrawn,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_hackathon_accepts_applications() {
        assert!(HackathonStatus::Published.accepts_applications());
        assert!(!HackathonStatus::Draft.accepts_applications());
        assert!(!HackathonStatus::Completed.accepts_applications());
    }

    #[test]
    fn test_status_serde_snake_case() {
        let json = serde_json::to_string(&ApplicationStatus::UnderReview).expect("serialize");
        assert_eq!(json, "\"under_review\"");
    }
}
