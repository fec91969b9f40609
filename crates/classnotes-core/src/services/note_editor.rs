//! Single-note editor with its attached collections.

use serde::Serialize;

use super::DatabaseService;
use crate::markdown::{MarkdownFormat, TextBuffer};
use crate::models::{
    Comment, CommentId, CommentThreads, CommentWithAuthor, EditHistoryEntry, Note, NoteId,
    NoteImage, NoteShare, NoteUrl, ShareType, UserId, HISTORY_LIMIT,
};
use crate::Result;

/// Outcome banner shown after an editor action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Self::Success(message) | Self::Error(message) => message,
        }
    }
}

pub struct NoteEditor {
    user_id: UserId,
    note: Note,
    pub buffer: TextBuffer,
    pub images: Vec<NoteImage>,
    pub urls: Vec<NoteUrl>,
    pub comments: Vec<CommentWithAuthor>,
    pub history: Vec<EditHistoryEntry>,
    last_saved: Option<i64>,
    saving: bool,
    notice: Option<Notice>,
}

impl NoteEditor {
    /// Load a note and its images, links and comments.
    pub async fn open(db: &DatabaseService, note_id: &NoteId, user_id: UserId) -> Result<Self> {
        let note = db
            .get_note(note_id)
            .await?
            .ok_or_else(|| crate::Error::NotFound(format!("note {note_id}")))?;

        let mut editor = Self {
            user_id,
            buffer: TextBuffer::new(note.content.clone()),
            note,
            images: Vec::new(),
            urls: Vec::new(),
            comments: Vec::new(),
            history: Vec::new(),
            last_saved: None,
            saving: false,
            notice: None,
        };
        editor.images = db.list_images(note_id).await?;
        editor.urls = db.list_urls(note_id).await?;
        editor.comments = db.list_comments(note_id).await?;
        Ok(editor)
    }

    pub const fn note(&self) -> &Note {
        &self.note
    }

    /// Unix ms of the last successful save in this session
    pub const fn last_saved(&self) -> Option<i64> {
        self.last_saved
    }

    pub const fn is_saving(&self) -> bool {
        self.saving
    }

    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Whether the buffer differs from the stored content
    pub fn is_dirty(&self) -> bool {
        self.buffer.text() != self.note.content
    }

    /// Persist the buffer and append an edit history row.
    pub async fn save(&mut self, db: &DatabaseService) -> bool {
        self.saving = true;
        let result = db
            .save_note_content(&self.note.id, self.buffer.text(), &self.user_id)
            .await;
        self.saving = false;

        match result {
            Ok((note, history)) => {
                self.note = note;
                self.last_saved = Some(history.edited_at);
                self.notice = None;
                true
            }
            Err(error) => {
                tracing::error!("Error saving note {}: {}", self.note.id, error);
                self.notice = Some(Notice::Error("Failed to save note".to_string()));
                false
            }
        }
    }

    /// Format the buffer's current selection.
    pub fn apply_format(&mut self, format: MarkdownFormat) -> bool {
        self.buffer.apply(format)
    }

    /// Record an image by file name; the stored URL is a placeholder.
    pub async fn attach_image(&mut self, db: &DatabaseService, file_name: &str) -> bool {
        let file_name = file_name.trim();
        if file_name.is_empty() {
            return false;
        }

        let image = NoteImage::placeholder(self.note.id, file_name, self.user_id);
        if let Err(error) = db.insert_image(&image).await {
            tracing::error!("Error uploading image: {}", error);
            self.notice = Some(Notice::Error("Failed to upload image".to_string()));
            return false;
        }
        match db.list_images(&self.note.id).await {
            Ok(images) => self.images = images,
            Err(error) => tracing::warn!("Failed to reload images: {}", error),
        }
        true
    }

    /// Attach a link; a blank title falls back to the URL.
    pub async fn add_link(&mut self, db: &DatabaseService, url: &str, title: Option<&str>) -> bool {
        let url = url.trim();
        if url.is_empty() {
            return false;
        }

        let link = NoteUrl::new(self.note.id, url, title, self.user_id);
        if let Err(error) = db.insert_url(&link).await {
            tracing::error!("Error adding URL: {}", error);
            self.notice = Some(Notice::Error("Failed to add URL".to_string()));
            return false;
        }
        match db.list_urls(&self.note.id).await {
            Ok(urls) => self.urls = urls,
            Err(error) => tracing::warn!("Failed to reload links: {}", error),
        }
        true
    }

    /// Post a comment, optionally as a reply to `reply_to`.
    pub async fn add_comment(
        &mut self,
        db: &DatabaseService,
        content: &str,
        reply_to: Option<CommentId>,
    ) -> bool {
        if content.trim().is_empty() {
            return false;
        }

        let comment = Comment::new(self.note.id, content, self.user_id, reply_to);
        if let Err(error) = db.insert_comment(&comment).await {
            tracing::error!("Error adding comment: {}", error);
            self.notice = Some(Notice::Error("Failed to add comment".to_string()));
            return false;
        }
        match db.list_comments(&self.note.id).await {
            Ok(comments) => self.comments = comments,
            Err(error) => tracing::warn!("Failed to reload comments: {}", error),
        }
        true
    }

    /// Comments arranged into one-level threads.
    pub fn comment_threads(&self) -> CommentThreads {
        CommentThreads::build(&self.comments)
    }

    /// Grant another user access to this note by their email.
    pub async fn share(
        &mut self,
        db: &DatabaseService,
        email: &str,
        share_type: ShareType,
    ) -> bool {
        let email = email.trim();
        if email.is_empty() {
            return false;
        }

        let recipient = match db.find_user_by_email(email).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                self.notice = Some(Notice::Error("User not found with that email".to_string()));
                return false;
            }
            Err(error) => {
                tracing::error!("Error sharing: {}", error);
                self.notice = Some(Notice::Error("Failed to share note".to_string()));
                return false;
            }
        };

        let grant = NoteShare::with_user(self.note.id, self.user_id, recipient.id, share_type);
        match db.insert_share(&grant).await {
            Ok(_) => {
                tracing::info!("Shared note {} with {}", self.note.id, recipient.id);
                self.notice = Some(Notice::Success("Note shared successfully!".to_string()));
                true
            }
            Err(error) => {
                tracing::error!("Error sharing: {}", error);
                self.notice = Some(Notice::Error("Failed to share note".to_string()));
                false
            }
        }
    }

    /// Fetch the most recent edits, newest first.
    pub async fn load_history(&mut self, db: &DatabaseService) -> Result<()> {
        self.history = db.list_history(&self.note.id, HISTORY_LIMIT).await?;
        Ok(())
    }
}
