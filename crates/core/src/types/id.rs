//! Newtype IDs for type-safe entity references.
//!
//! Document ids in the store (and the auth provider's identity id) are opaque
//! strings. Use the `define_id!` macro to create type-safe wrappers that
//! prevent accidentally mixing ids from different entity types.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>`, and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use hackdeck_core::define_id;
/// define_id!(Uid);
/// define_id!(ProjectId);
///
/// let uid = Uid::new("u-1");
/// let project_id = ProjectId::new("p-1");
///
/// // These are different types, so this won't compile:
/// // let _: Uid = project_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(Uid);
define_id!(ProjectId);
define_id!(HackathonId);
define_id!(ApplicationId);
define_id!(NotificationId);
define_id!(AchievementId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        let uid = Uid::new("abc123");
        assert_eq!(uid.as_str(), "abc123");
        assert_eq!(uid.to_string(), "abc123");
        assert_eq!(String::from(uid), "abc123");
    }

    #[test]
    fn test_serde_transparent() {
        let id = ProjectId::new("p-42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"p-42\"");

        let parsed: ProjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
