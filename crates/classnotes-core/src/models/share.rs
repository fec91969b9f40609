//! Share grant model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::id::{ClassId, NoteId, NoteShareId, UserId};

/// Permission granted by a share
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareType {
    #[default]
    View,
    Edit,
}

impl ShareType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
        }
    }

    /// Flip between the two permissions
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::View => Self::Edit,
            Self::Edit => Self::View,
        }
    }
}

impl fmt::Display for ShareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShareType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "view" => Ok(Self::View),
            "edit" => Ok(Self::Edit),
            other => Err(format!("unknown share type '{other}'")),
        }
    }
}

/// A grant giving another user access to a note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteShare {
    pub id: NoteShareId,
    pub note_id: NoteId,
    pub shared_by: UserId,
    pub shared_with_user: Option<UserId>,
    pub shared_with_class: Option<ClassId>,
    pub share_type: ShareType,
    pub shared_at: i64,
}

impl NoteShare {
    #[must_use]
    pub fn with_user(
        note_id: NoteId,
        shared_by: UserId,
        shared_with: UserId,
        share_type: ShareType,
    ) -> Self {
        Self {
            id: NoteShareId::new(),
            note_id,
            shared_by,
            shared_with_user: Some(shared_with),
            shared_with_class: None,
            share_type,
            shared_at: crate::util::now_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_type_toggles() {
        assert_eq!(ShareType::View.toggled(), ShareType::Edit);
        assert_eq!(ShareType::Edit.toggled(), ShareType::View);
        assert_eq!(ShareType::default(), ShareType::View);
    }

    #[test]
    fn share_type_parses_case_insensitively() {
        assert_eq!("EDIT".parse::<ShareType>().unwrap(), ShareType::Edit);
        assert!("admin".parse::<ShareType>().is_err());
    }
}
