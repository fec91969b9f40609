//! Note model and its attachment collections

use serde::{Deserialize, Serialize};

use super::id::{NoteId, NoteImageId, NoteUrlId, SubjectId, UserId};

const PLACEHOLDER_IMAGE_BASE: &str = "https://via.placeholder.com/800x400?text=";

/// A note in a subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    /// Markdown content, empty for a fresh note
    pub content: String,
    pub subject_id: SubjectId,
    pub author_id: Option<UserId>,
    pub is_public: bool,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
}

impl Note {
    /// Create a new public note with empty content
    #[must_use]
    pub fn new(title: &str, subject_id: SubjectId, author_id: UserId) -> Self {
        let now = crate::util::now_millis();
        Self {
            id: NoteId::new(),
            title: title.trim().to_string(),
            content: String::new(),
            subject_id,
            author_id: Some(author_id),
            is_public: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// An image attached to a note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteImage {
    pub id: NoteImageId,
    pub note_id: NoteId,
    pub image_url: String,
    pub caption: Option<String>,
    pub uploaded_by: Option<UserId>,
    pub uploaded_at: i64,
}

impl NoteImage {
    /// Attach an image by file name.
    ///
    /// No bytes are uploaded: the stored reference is a placeholder URL derived
    /// from the file name, and the caption is the file name itself.
    #[must_use]
    pub fn placeholder(note_id: NoteId, file_name: &str, uploaded_by: UserId) -> Self {
        Self {
            id: NoteImageId::new(),
            note_id,
            image_url: placeholder_image_url(file_name),
            caption: Some(file_name.to_string()),
            uploaded_by: Some(uploaded_by),
            uploaded_at: crate::util::now_millis(),
        }
    }
}

/// Placeholder image URL carrying the percent-encoded file name.
#[must_use]
pub fn placeholder_image_url(file_name: &str) -> String {
    format!("{PLACEHOLDER_IMAGE_BASE}{}", urlencoding::encode(file_name))
}

/// A link attached to a note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteUrl {
    pub id: NoteUrlId,
    pub note_id: NoteId,
    pub url: String,
    pub title: Option<String>,
    pub added_by: Option<UserId>,
    pub added_at: i64,
}

impl NoteUrl {
    /// Create a link; a blank title falls back to the URL text.
    #[must_use]
    pub fn new(note_id: NoteId, url: &str, title: Option<&str>, added_by: UserId) -> Self {
        let url = url.trim().to_string();
        let title = title
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .map_or_else(|| url.clone(), str::to_string);
        Self {
            id: NoteUrlId::new(),
            note_id,
            url,
            title: Some(title),
            added_by: Some(added_by),
            added_at: crate::util::now_millis(),
        }
    }

    /// Title to show, which is the URL when none was stored
    #[must_use]
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_note_is_public_and_empty() {
        let note = Note::new(" Week 1 ", SubjectId::new(), UserId::new());
        assert_eq!(note.title, "Week 1");
        assert_eq!(note.content, "");
        assert!(note.is_public);
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn placeholder_url_encodes_file_name() {
        assert_eq!(
            placeholder_image_url("my photo.png"),
            "https://via.placeholder.com/800x400?text=my%20photo.png"
        );
    }

    #[test]
    fn placeholder_image_uses_file_name_as_caption() {
        let image = NoteImage::placeholder(NoteId::new(), "board.jpg", UserId::new());
        assert_eq!(image.caption.as_deref(), Some("board.jpg"));
        assert!(image.image_url.ends_with("board.jpg"));
    }

    #[test]
    fn link_title_defaults_to_url() {
        let link = NoteUrl::new(NoteId::new(), "https://rust-lang.org", Some("  "), UserId::new());
        assert_eq!(link.title.as_deref(), Some("https://rust-lang.org"));

        let titled = NoteUrl::new(
            NoteId::new(),
            "https://rust-lang.org",
            Some("Rust"),
            UserId::new(),
        );
        assert_eq!(titled.label(), "Rust");
    }
}
