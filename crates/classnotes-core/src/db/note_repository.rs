//! Note repository
//!
//! Covers notes plus the collections hanging off a note: images, links,
//! edit history and shares.

use libsql::{params, Connection, Row};

use super::{begin, commit, id_column, nullable_text, optional_id_column, optional_text, rollback};
use crate::error::{Error, Result};
use crate::models::{
    EditHistory, EditHistoryEntry, Note, NoteId, NoteImage, NoteShare, NoteUrl, ShareType,
    SubjectId, UserId,
};

const NOTE_COLUMNS: &str =
    "id, title, content, subject_id, author_id, is_public, created_at, updated_at";

/// Storage operations on `notes` and their attachments
#[allow(async_fn_in_trait)]
pub trait NoteRepository {
    async fn insert(&self, note: &Note) -> Result<Note>;

    async fn get(&self, id: &NoteId) -> Result<Option<Note>>;

    /// Notes of a subject, most recently updated first
    async fn list_by_subject(&self, subject_id: &SubjectId) -> Result<Vec<Note>>;

    /// Overwrite a note's content and append the matching history row.
    ///
    /// Both writes happen in one transaction; the recorded `content_before`
    /// is whatever the store held when the transaction started.
    async fn save_content(
        &self,
        id: &NoteId,
        content: &str,
        edited_by: &UserId,
    ) -> Result<(Note, EditHistory)>;

    /// History rows newest first, joined with editor names
    async fn list_history(&self, id: &NoteId, limit: usize) -> Result<Vec<EditHistoryEntry>>;

    async fn insert_image(&self, image: &NoteImage) -> Result<NoteImage>;

    async fn list_images(&self, id: &NoteId) -> Result<Vec<NoteImage>>;

    async fn insert_url(&self, url: &NoteUrl) -> Result<NoteUrl>;

    async fn list_urls(&self, id: &NoteId) -> Result<Vec<NoteUrl>>;

    async fn insert_share(&self, share: &NoteShare) -> Result<NoteShare>;

    async fn list_shares(&self, id: &NoteId) -> Result<Vec<NoteShare>>;
}

/// libSQL implementation of `NoteRepository`
pub struct LibSqlNoteRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlNoteRepository<'a> {
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_note(row: &Row) -> Result<Note> {
        Ok(Note {
            id: id_column(row, 0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            subject_id: id_column(row, 3)?,
            author_id: optional_id_column(row, 4)?,
            is_public: row.get::<i64>(5)? != 0,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    fn parse_history(row: &Row) -> Result<EditHistoryEntry> {
        Ok(EditHistoryEntry {
            history: EditHistory {
                id: id_column(row, 0)?,
                note_id: id_column(row, 1)?,
                edited_by: optional_id_column(row, 2)?,
                content_before: optional_text(row, 3)?,
                content_after: optional_text(row, 4)?,
                edited_at: row.get(5)?,
            },
            editor_full_name: optional_text(row, 6)?,
            editor_username: optional_text(row, 7)?,
        })
    }

    fn parse_image(row: &Row) -> Result<NoteImage> {
        Ok(NoteImage {
            id: id_column(row, 0)?,
            note_id: id_column(row, 1)?,
            image_url: row.get(2)?,
            caption: optional_text(row, 3)?,
            uploaded_by: optional_id_column(row, 4)?,
            uploaded_at: row.get(5)?,
        })
    }

    fn parse_url(row: &Row) -> Result<NoteUrl> {
        Ok(NoteUrl {
            id: id_column(row, 0)?,
            note_id: id_column(row, 1)?,
            url: row.get(2)?,
            title: optional_text(row, 3)?,
            added_by: optional_id_column(row, 4)?,
            added_at: row.get(5)?,
        })
    }

    fn parse_share(row: &Row) -> Result<NoteShare> {
        let share_type: String = row.get(5)?;
        Ok(NoteShare {
            id: id_column(row, 0)?,
            note_id: id_column(row, 1)?,
            shared_by: id_column(row, 2)?,
            shared_with_user: optional_id_column(row, 3)?,
            shared_with_class: optional_id_column(row, 4)?,
            share_type: share_type
                .parse::<ShareType>()
                .map_err(Error::Database)?,
            shared_at: row.get(6)?,
        })
    }

    async fn write_content(
        &self,
        id: &NoteId,
        content: &str,
        edited_by: &UserId,
    ) -> Result<(Note, EditHistory)> {
        let mut note = self
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("note {id}")))?;

        let history = EditHistory::new(note.id, *edited_by, &note.content, content);
        note.content = content.to_string();
        note.updated_at = history.edited_at;

        self.conn
            .execute(
                "UPDATE notes SET content = ?, updated_at = ? WHERE id = ?",
                params![note.content.clone(), note.updated_at, note.id.as_str()],
            )
            .await?;
        self.conn
            .execute(
                "INSERT INTO edit_history (id, note_id, edited_by, content_before, content_after, edited_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
                params![
                    history.id.as_str(),
                    history.note_id.as_str(),
                    nullable_text(history.edited_by.map(|id| id.as_str())),
                    nullable_text(history.content_before.clone()),
                    nullable_text(history.content_after.clone()),
                    history.edited_at
                ],
            )
            .await?;

        Ok((note, history))
    }
}

impl NoteRepository for LibSqlNoteRepository<'_> {
    async fn insert(&self, note: &Note) -> Result<Note> {
        self.conn
            .execute(
                "INSERT INTO notes (id, title, content, subject_id, author_id, is_public, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    note.id.as_str(),
                    note.title.clone(),
                    note.content.clone(),
                    note.subject_id.as_str(),
                    nullable_text(note.author_id.map(|id| id.as_str())),
                    i64::from(note.is_public),
                    note.created_at,
                    note.updated_at
                ],
            )
            .await?;
        Ok(note.clone())
    }

    async fn get(&self, id: &NoteId) -> Result<Option<Note>> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?"),
                params![id.as_str()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_note(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_by_subject(&self, subject_id: &SubjectId) -> Result<Vec<Note>> {
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT {NOTE_COLUMNS} FROM notes WHERE subject_id = ?
                     ORDER BY updated_at DESC, id DESC"
                ),
                params![subject_id.as_str()],
            )
            .await?;

        let mut notes = Vec::new();
        while let Some(row) = rows.next().await? {
            notes.push(Self::parse_note(&row)?);
        }
        Ok(notes)
    }

    async fn save_content(
        &self,
        id: &NoteId,
        content: &str,
        edited_by: &UserId,
    ) -> Result<(Note, EditHistory)> {
        begin(self.conn).await?;
        match self.write_content(id, content, edited_by).await {
            Ok(saved) => {
                commit(self.conn).await?;
                tracing::debug!("Saved note {id} ({} chars)", content.chars().count());
                Ok(saved)
            }
            Err(error) => {
                rollback(self.conn).await;
                Err(error)
            }
        }
    }

    async fn list_history(&self, id: &NoteId, limit: usize) -> Result<Vec<EditHistoryEntry>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut rows = self
            .conn
            .query(
                "SELECT h.id, h.note_id, h.edited_by, h.content_before, h.content_after, h.edited_at,
                        u.full_name, u.username
                 FROM edit_history h
                 LEFT JOIN users u ON u.id = h.edited_by
                 WHERE h.note_id = ?
                 ORDER BY h.edited_at DESC, h.id DESC
                 LIMIT ?",
                params![id.as_str(), limit],
            )
            .await?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(Self::parse_history(&row)?);
        }
        Ok(entries)
    }

    async fn insert_image(&self, image: &NoteImage) -> Result<NoteImage> {
        self.conn
            .execute(
                "INSERT INTO note_images (id, note_id, image_url, caption, uploaded_by, uploaded_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
                params![
                    image.id.as_str(),
                    image.note_id.as_str(),
                    image.image_url.clone(),
                    nullable_text(image.caption.clone()),
                    nullable_text(image.uploaded_by.map(|id| id.as_str())),
                    image.uploaded_at
                ],
            )
            .await?;
        Ok(image.clone())
    }

    async fn list_images(&self, id: &NoteId) -> Result<Vec<NoteImage>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, note_id, image_url, caption, uploaded_by, uploaded_at
                 FROM note_images WHERE note_id = ?
                 ORDER BY uploaded_at DESC, id DESC",
                params![id.as_str()],
            )
            .await?;

        let mut images = Vec::new();
        while let Some(row) = rows.next().await? {
            images.push(Self::parse_image(&row)?);
        }
        Ok(images)
    }

    async fn insert_url(&self, url: &NoteUrl) -> Result<NoteUrl> {
        self.conn
            .execute(
                "INSERT INTO note_urls (id, note_id, url, title, added_by, added_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
                params![
                    url.id.as_str(),
                    url.note_id.as_str(),
                    url.url.clone(),
                    nullable_text(url.title.clone()),
                    nullable_text(url.added_by.map(|id| id.as_str())),
                    url.added_at
                ],
            )
            .await?;
        Ok(url.clone())
    }

    async fn list_urls(&self, id: &NoteId) -> Result<Vec<NoteUrl>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, note_id, url, title, added_by, added_at
                 FROM note_urls WHERE note_id = ?
                 ORDER BY added_at DESC, id DESC",
                params![id.as_str()],
            )
            .await?;

        let mut urls = Vec::new();
        while let Some(row) = rows.next().await? {
            urls.push(Self::parse_url(&row)?);
        }
        Ok(urls)
    }

    async fn insert_share(&self, share: &NoteShare) -> Result<NoteShare> {
        self.conn
            .execute(
                "INSERT INTO note_shares (id, note_id, shared_by, shared_with_user, shared_with_class, share_type, shared_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                params![
                    share.id.as_str(),
                    share.note_id.as_str(),
                    share.shared_by.as_str(),
                    nullable_text(share.shared_with_user.map(|id| id.as_str())),
                    nullable_text(share.shared_with_class.map(|id| id.as_str())),
                    share.share_type.as_str(),
                    share.shared_at
                ],
            )
            .await?;
        Ok(share.clone())
    }

    async fn list_shares(&self, id: &NoteId) -> Result<Vec<NoteShare>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, note_id, shared_by, shared_with_user, shared_with_class, share_type, shared_at
                 FROM note_shares WHERE note_id = ?
                 ORDER BY shared_at DESC, id DESC",
                params![id.as_str()],
            )
            .await?;

        let mut shares = Vec::new();
        while let Some(row) = rows.next().await? {
            shares.push(Self::parse_share(&row)?);
        }
        Ok(shares)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{
        ClassRepository, Database, LibSqlClassRepository, LibSqlSubjectRepository,
        LibSqlUserRepository, SubjectRepository, UserRepository,
    };
    use crate::models::{Class, Subject, User};
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    async fn setup() -> (Database, User, Subject) {
        let db = Database::open_in_memory().await.unwrap();
        let user = User::new(UserId::new(), "writer@example.com", "Writer", "writer");
        LibSqlUserRepository::new(db.connection())
            .insert(&user)
            .await
            .unwrap();
        let class = Class::new("Class", "NOTE01".to_string(), user.id);
        LibSqlClassRepository::new(db.connection())
            .create_with_admin(&class)
            .await
            .unwrap();
        let subject = Subject::new("History", class.id, user.id, &mut StdRng::seed_from_u64(1));
        LibSqlSubjectRepository::new(db.connection())
            .insert(&subject)
            .await
            .unwrap();
        (db, user, subject)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn new_note_starts_empty_and_public() {
        let (db, user, subject) = setup().await;
        let repo = LibSqlNoteRepository::new(db.connection());

        let note = repo
            .insert(&Note::new("Week 1", subject.id, user.id))
            .await
            .unwrap();
        let fetched = repo.get(&note.id).await.unwrap().unwrap();
        assert_eq!(fetched.content, "");
        assert!(fetched.is_public);
        assert_eq!(fetched, note);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn save_content_records_before_and_after() {
        let (db, user, subject) = setup().await;
        let repo = LibSqlNoteRepository::new(db.connection());
        let note = repo
            .insert(&Note::new("Week 1", subject.id, user.id))
            .await
            .unwrap();

        let (saved, history) = repo.save_content(&note.id, "first", &user.id).await.unwrap();
        assert_eq!(saved.content, "first");
        assert_eq!(history.content_before.as_deref(), Some(""));
        assert_eq!(history.content_after.as_deref(), Some("first"));

        let (_, second) = repo.save_content(&note.id, "second", &user.id).await.unwrap();
        assert_eq!(second.content_before.as_deref(), Some("first"));

        let entries = repo.list_history(&note.id, 20).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].history.content_after.as_deref(), Some("second"));
        assert_eq!(entries[0].editor_name(), "Writer");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn save_content_on_missing_note_leaves_no_history() {
        let (db, user, _) = setup().await;
        let repo = LibSqlNoteRepository::new(db.connection());

        let missing = NoteId::new();
        let error = repo.save_content(&missing, "x", &user.id).await.unwrap_err();
        assert!(matches!(error, Error::NotFound(_)));
        assert!(repo.list_history(&missing, 20).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn history_respects_limit() {
        let (db, user, subject) = setup().await;
        let repo = LibSqlNoteRepository::new(db.connection());
        let note = repo
            .insert(&Note::new("Busy", subject.id, user.id))
            .await
            .unwrap();

        for i in 0..5 {
            repo.save_content(&note.id, &format!("v{i}"), &user.id)
                .await
                .unwrap();
        }
        assert_eq!(repo.list_history(&note.id, 3).await.unwrap().len(), 3);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn attachments_and_shares_round_trip() {
        let (db, user, subject) = setup().await;
        let repo = LibSqlNoteRepository::new(db.connection());
        let note = repo
            .insert(&Note::new("Links", subject.id, user.id))
            .await
            .unwrap();

        let image = NoteImage::placeholder(note.id, "diagram.png", user.id);
        repo.insert_image(&image).await.unwrap();
        let url = NoteUrl::new(note.id, "https://example.com", None, user.id);
        repo.insert_url(&url).await.unwrap();

        let friend = User::new(UserId::new(), "friend@example.com", "Friend", "friend");
        LibSqlUserRepository::new(db.connection())
            .insert(&friend)
            .await
            .unwrap();
        let share = NoteShare::with_user(note.id, user.id, friend.id, ShareType::Edit);
        repo.insert_share(&share).await.unwrap();

        assert_eq!(repo.list_images(&note.id).await.unwrap(), vec![image]);
        assert_eq!(repo.list_urls(&note.id).await.unwrap(), vec![url]);
        assert_eq!(repo.list_shares(&note.id).await.unwrap(), vec![share]);
    }
}
