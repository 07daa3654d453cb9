//! Strongly-typed identifiers used across the domain crates.
//!
//! Backend rows are keyed by UUIDs; each entity wraps the raw UUID in its own
//! newtype so a `CustomerId` can never be passed where an `ItemId` is expected.

/// Define a UUID-backed identifier newtype.
///
/// ```ignore
/// ceramerp_core::define_id!(CustomerId, "CustomerId");
/// ```
#[macro_export]
macro_rules! define_id {
    ($(#[$meta:meta])* $t:ident, $name:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $t($crate::Uuid);

        impl $t {
            /// Create a new random identifier.
            ///
            /// The backend normally assigns ids; this is for tests and drafts.
            pub fn new() -> Self {
                Self($crate::Uuid::new_v4())
            }

            pub fn from_uuid(uuid: $crate::Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &$crate::Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$crate::Uuid> for $t {
            fn from(value: $crate::Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$t> for $crate::Uuid {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl core::str::FromStr for $t {
            type Err = $crate::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = <$crate::Uuid as core::str::FromStr>::from_str(s)
                    .map_err(|e| $crate::DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(uuid))
            }
        }
    };
}

define_id!(
    /// Identifier of an authenticated user (auth service subject).
    UserId,
    "UserId"
);
