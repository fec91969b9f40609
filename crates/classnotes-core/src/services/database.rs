//! Shared database service wrapper used by every client component.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::db::{
    ClassRepository, CommentRepository, Database, IdentityRepository, LibSqlClassRepository,
    LibSqlCommentRepository, LibSqlIdentityRepository, LibSqlNoteRepository,
    LibSqlSubjectRepository, LibSqlUserRepository, NoteRepository, StoredIdentity,
    SubjectRepository, UserRepository,
};
use crate::models::{
    Class, ClassId, ClassMember, Comment, CommentWithAuthor, EditHistory, EditHistoryEntry,
    Note, NoteId, NoteImage, NoteShare, NoteUrl, Subject, SubjectId, User, UserId,
};
use crate::Result;

/// Thread-safe service for DB and repository operations.
///
/// Clones share one connection; the mutex serialises every call.
#[derive(Clone)]
pub struct DatabaseService {
    db: Arc<Mutex<Database>>,
    db_path: Option<PathBuf>,
}

impl DatabaseService {
    /// Open a database service at the given filesystem path.
    ///
    /// A file that is not a database is moved aside and a fresh one created.
    pub async fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = match Database::open(&db_path).await {
            Ok(db) => db,
            Err(error) if Self::is_corrupted_db_error(&error) => {
                tracing::warn!(
                    "Detected invalid local DB file at {}: {}",
                    db_path.display(),
                    error
                );
                Self::quarantine_corrupted_db_file(&db_path)?;
                Database::open(&db_path).await?
            }
            Err(error) => return Err(error),
        };

        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: Some(db_path),
        })
    }

    /// Open an in-memory database service (primarily for tests).
    pub async fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory().await?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: None,
        })
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn is_corrupted_db_error(error: &crate::Error) -> bool {
        error
            .to_string()
            .to_ascii_lowercase()
            .contains("file is not a database")
    }

    fn quarantine_corrupted_db_file(db_path: &Path) -> Result<()> {
        if db_path.exists() {
            let timestamp = chrono::Utc::now().timestamp_millis();
            let file_name = db_path
                .file_name()
                .map_or_else(|| "classnotes.db".into(), |name| name.to_string_lossy());
            let backup_path = db_path.with_file_name(format!("{file_name}.corrupt-{timestamp}"));

            std::fs::rename(db_path, &backup_path)?;
            tracing::warn!(
                "Moved corrupted local DB file from {} to {}",
                db_path.display(),
                backup_path.display()
            );
        }
        Ok(())
    }

    // Users

    pub async fn insert_user(&self, user: &User) -> Result<User> {
        let db = self.db.lock().await;
        LibSqlUserRepository::new(db.connection()).insert(user).await
    }

    pub async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        let db = self.db.lock().await;
        LibSqlUserRepository::new(db.connection()).get(id).await
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let db = self.db.lock().await;
        LibSqlUserRepository::new(db.connection())
            .find_by_email(email)
            .await
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let db = self.db.lock().await;
        LibSqlUserRepository::new(db.connection())
            .find_by_username(username)
            .await
    }

    pub async fn touch_last_login(&self, id: &UserId, at: i64) -> Result<bool> {
        let db = self.db.lock().await;
        LibSqlUserRepository::new(db.connection())
            .touch_last_login(id, at)
            .await
    }

    // Classes

    /// Insert a class and its creator's admin membership together.
    pub async fn create_class(&self, class: &Class) -> Result<(Class, ClassMember)> {
        let db = self.db.lock().await;
        LibSqlClassRepository::new(db.connection())
            .create_with_admin(class)
            .await
    }

    pub async fn find_class_by_invite_code(&self, code: &str) -> Result<Option<Class>> {
        let db = self.db.lock().await;
        LibSqlClassRepository::new(db.connection())
            .find_by_invite_code(code)
            .await
    }

    /// Classes the user belongs to, newest first.
    pub async fn list_classes_for_member(&self, user_id: &UserId) -> Result<Vec<Class>> {
        let db = self.db.lock().await;
        LibSqlClassRepository::new(db.connection())
            .list_for_member(user_id)
            .await
    }

    pub async fn insert_member(&self, member: &ClassMember) -> Result<ClassMember> {
        let db = self.db.lock().await;
        LibSqlClassRepository::new(db.connection())
            .insert_member(member)
            .await
    }

    pub async fn find_member(
        &self,
        class_id: &ClassId,
        user_id: &UserId,
    ) -> Result<Option<ClassMember>> {
        let db = self.db.lock().await;
        LibSqlClassRepository::new(db.connection())
            .find_member(class_id, user_id)
            .await
    }

    pub async fn list_members(&self, class_id: &ClassId) -> Result<Vec<ClassMember>> {
        let db = self.db.lock().await;
        LibSqlClassRepository::new(db.connection())
            .list_members(class_id)
            .await
    }

    // Subjects

    pub async fn insert_subject(&self, subject: &Subject) -> Result<Subject> {
        let db = self.db.lock().await;
        LibSqlSubjectRepository::new(db.connection())
            .insert(subject)
            .await
    }

    pub async fn list_subjects(&self, class_id: &ClassId) -> Result<Vec<Subject>> {
        let db = self.db.lock().await;
        LibSqlSubjectRepository::new(db.connection())
            .list_by_class(class_id)
            .await
    }

    // Notes

    pub async fn insert_note(&self, note: &Note) -> Result<Note> {
        let db = self.db.lock().await;
        LibSqlNoteRepository::new(db.connection()).insert(note).await
    }

    pub async fn get_note(&self, id: &NoteId) -> Result<Option<Note>> {
        let db = self.db.lock().await;
        LibSqlNoteRepository::new(db.connection()).get(id).await
    }

    pub async fn list_notes(&self, subject_id: &SubjectId) -> Result<Vec<Note>> {
        let db = self.db.lock().await;
        LibSqlNoteRepository::new(db.connection())
            .list_by_subject(subject_id)
            .await
    }

    /// Overwrite note content and append an edit history row atomically.
    pub async fn save_note_content(
        &self,
        id: &NoteId,
        content: &str,
        edited_by: &UserId,
    ) -> Result<(Note, EditHistory)> {
        let db = self.db.lock().await;
        LibSqlNoteRepository::new(db.connection())
            .save_content(id, content, edited_by)
            .await
    }

    pub async fn list_history(&self, id: &NoteId, limit: usize) -> Result<Vec<EditHistoryEntry>> {
        let db = self.db.lock().await;
        LibSqlNoteRepository::new(db.connection())
            .list_history(id, limit)
            .await
    }

    pub async fn insert_image(&self, image: &NoteImage) -> Result<NoteImage> {
        let db = self.db.lock().await;
        LibSqlNoteRepository::new(db.connection())
            .insert_image(image)
            .await
    }

    pub async fn list_images(&self, id: &NoteId) -> Result<Vec<NoteImage>> {
        let db = self.db.lock().await;
        LibSqlNoteRepository::new(db.connection()).list_images(id).await
    }

    pub async fn insert_url(&self, url: &NoteUrl) -> Result<NoteUrl> {
        let db = self.db.lock().await;
        LibSqlNoteRepository::new(db.connection()).insert_url(url).await
    }

    pub async fn list_urls(&self, id: &NoteId) -> Result<Vec<NoteUrl>> {
        let db = self.db.lock().await;
        LibSqlNoteRepository::new(db.connection()).list_urls(id).await
    }

    pub async fn insert_share(&self, share: &NoteShare) -> Result<NoteShare> {
        let db = self.db.lock().await;
        LibSqlNoteRepository::new(db.connection())
            .insert_share(share)
            .await
    }

    pub async fn list_shares(&self, id: &NoteId) -> Result<Vec<NoteShare>> {
        let db = self.db.lock().await;
        LibSqlNoteRepository::new(db.connection()).list_shares(id).await
    }

    // Comments

    pub async fn insert_comment(&self, comment: &Comment) -> Result<Comment> {
        let db = self.db.lock().await;
        LibSqlCommentRepository::new(db.connection())
            .insert(comment)
            .await
    }

    pub async fn list_comments(&self, note_id: &NoteId) -> Result<Vec<CommentWithAuthor>> {
        let db = self.db.lock().await;
        LibSqlCommentRepository::new(db.connection())
            .list_with_authors(note_id)
            .await
    }

    // Local auth identities

    pub async fn insert_identity(&self, identity: &StoredIdentity) -> Result<()> {
        let db = self.db.lock().await;
        LibSqlIdentityRepository::new(db.connection())
            .insert_identity(identity)
            .await
    }

    pub async fn find_identity_by_email(&self, email: &str) -> Result<Option<StoredIdentity>> {
        let db = self.db.lock().await;
        LibSqlIdentityRepository::new(db.connection())
            .find_identity_by_email(email)
            .await
    }

    pub async fn insert_auth_session(
        &self,
        token: &str,
        id: &UserId,
        expires_at: i64,
    ) -> Result<()> {
        let db = self.db.lock().await;
        LibSqlIdentityRepository::new(db.connection())
            .insert_session(token, id, expires_at)
            .await
    }

    pub async fn find_auth_session(&self, token: &str, now: i64) -> Result<Option<StoredIdentity>> {
        let db = self.db.lock().await;
        LibSqlIdentityRepository::new(db.connection())
            .find_session(token, now)
            .await
    }

    pub async fn delete_auth_session(&self, token: &str) -> Result<bool> {
        let db = self.db.lock().await;
        LibSqlIdentityRepository::new(db.connection())
            .delete_session(token)
            .await
    }
}
