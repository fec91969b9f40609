//! Record identifiers
//!
//! Every collection keys its rows by a UUID v7 (time-sortable) wrapped in its
//! own newtype so ids of different collections cannot be mixed up.

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new unique ID using UUID v7
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Get the string representation of this ID
            #[must_use]
            pub fn as_str(&self) -> String {
                self.0.to_string()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s.trim())?))
            }
        }
    };
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

record_id!(
    /// Identifier of a user profile (shared with the auth identity)
    UserId
);
record_id!(
    /// Identifier of a class
    ClassId
);
record_id!(
    /// Identifier of a class membership row
    ClassMemberId
);
record_id!(
    /// Identifier of a subject
    SubjectId
);
record_id!(
    /// Identifier of a note
    NoteId
);
record_id!(
    /// Identifier of a note image
    NoteImageId
);
record_id!(
    /// Identifier of a note link
    NoteUrlId
);
record_id!(
    /// Identifier of a comment
    CommentId
);
record_id!(
    /// Identifier of an edit history row
    EditHistoryId
);
record_id!(
    /// Identifier of a share grant
    NoteShareId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(NoteId::new(), NoteId::new());
    }

    #[test]
    fn id_parse_accepts_display_form() {
        let id = ClassId::new();
        let parsed: ClassId = id.as_str().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn id_parse_rejects_garbage() {
        assert!("not-an-id".parse::<UserId>().is_err());
    }

    #[test]
    fn id_serializes_as_plain_string() {
        let id = SubjectId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }
}
