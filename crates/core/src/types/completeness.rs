//! Profile completeness scoring.
//!
//! A weighted sum over populated profile fields, expressed as a percentage.
//! The weights are fixed; the score is recomputed on every profile update and
//! stored on the profile record so listings can sort/filter on it without
//! recomputation.

/// Which profile fields are populated.
///
/// Built by the profile service from the stored record; `true` means the
/// field is present and non-empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileFacets {
    pub display_name: bool,
    pub bio: bool,
    pub skills: bool,
    pub avatar: bool,
    pub location: bool,
    pub role: bool,
    pub github: bool,
    pub website: bool,
}

/// Field weights, summing to 100.
const WEIGHTS: &[(fn(&ProfileFacets) -> bool, u8)] = &[
    (|f| f.display_name, 15),
    (|f| f.bio, 15),
    (|f| f.skills, 20),
    (|f| f.avatar, 10),
    (|f| f.location, 10),
    (|f| f.role, 10),
    (|f| f.github, 10),
    (|f| f.website, 10),
];

/// Compute the completeness score (0-100) for a set of populated fields.
#[must_use]
pub fn completeness_score(facets: &ProfileFacets) -> u8 {
    WEIGHTS
        .iter()
        .filter(|(present, _)| present(facets))
        .map(|(_, weight)| weight)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_profile_scores_zero() {
        assert_eq!(completeness_score(&ProfileFacets::default()), 0);
    }

    #[test]
    fn test_full_profile_scores_hundred() {
        let facets = ProfileFacets {
            display_name: true,
            bio: true,
            skills: true,
            avatar: true,
            location: true,
            role: true,
            github: true,
            website: true,
        };
        assert_eq!(completeness_score(&facets), 100);
    }

    #[test]
    fn test_weights_sum_to_hundred() {
        let total: u8 = WEIGHTS.iter().map(|(_, w)| w).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_partial_profile() {
        let facets = ProfileFacets {
            display_name: true,
            skills: true,
            ..ProfileFacets::default()
        };
        assert_eq!(completeness_score(&facets), 35);
    }
}
