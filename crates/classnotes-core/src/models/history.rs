//! Edit history model

use serde::{Deserialize, Serialize};

use super::id::{EditHistoryId, NoteId, UserId};

/// Maximum number of history rows shown for a note
pub const HISTORY_LIMIT: usize = 20;

/// One saved revision of a note's content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditHistory {
    pub id: EditHistoryId,
    pub note_id: NoteId,
    pub edited_by: Option<UserId>,
    pub content_before: Option<String>,
    pub content_after: Option<String>,
    pub edited_at: i64,
}

impl EditHistory {
    #[must_use]
    pub fn new(note_id: NoteId, edited_by: UserId, before: &str, after: &str) -> Self {
        Self {
            id: EditHistoryId::new(),
            note_id,
            edited_by: Some(edited_by),
            content_before: Some(before.to_string()),
            content_after: Some(after.to_string()),
            edited_at: crate::util::now_millis(),
        }
    }
}

/// History row joined with the editor's display fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditHistoryEntry {
    #[serde(flatten)]
    pub history: EditHistory,
    pub editor_full_name: Option<String>,
    pub editor_username: Option<String>,
}

impl EditHistoryEntry {
    /// Editor's full name, then username, then a generic label
    #[must_use]
    pub fn editor_name(&self) -> &str {
        self.editor_full_name
            .as_deref()
            .or(self.editor_username.as_deref())
            .unwrap_or("Unknown")
    }
}
