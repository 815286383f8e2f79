//! Identifier newtypes.

use fabula_error::{StoryError, StoryErrorKind};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Serialize,
            Deserialize,
            derive_more::Display,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse an identifier, rejecting anything that is not a UUID.
            pub fn parse(input: &str) -> Result<Self, StoryError> {
                Uuid::parse_str(input.trim()).map(Self).map_err(|_| {
                    StoryError::new(StoryErrorKind::InvalidIdentifier(format!(
                        "{} '{}'",
                        $label, input
                    )))
                })
            }

            /// Underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = StoryError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

define_id!(
    /// Identifier of a [`Story`](crate::Story).
    ///
    /// ```
    /// use fabula_core::StoryId;
    ///
    /// assert!(StoryId::parse("not-an-id").is_err());
    /// let id = StoryId::new();
    /// assert_eq!(StoryId::parse(&id.to_string()).unwrap(), id);
    /// ```
    StoryId,
    "story id"
);

define_id!(
    /// Identifier of the user owning a story.
    UserId,
    "user id"
);

define_id!(
    /// Identifier of a stage [`Artifact`](crate::Artifact).
    ArtifactId,
    "artifact id"
);

define_id!(
    /// Identifier of a [`Visual`](crate::Visual) collection.
    VisualId,
    "visual id"
);
