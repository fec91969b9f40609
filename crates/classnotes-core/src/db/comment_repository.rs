//! Comment repository

use libsql::{params, Connection, Row};

use super::{id_column, nullable_text, optional_id_column, optional_text};
use crate::error::Result;
use crate::models::{AuthorSummary, Comment, CommentWithAuthor, NoteId};

/// Storage operations on `comments`
#[allow(async_fn_in_trait)]
pub trait CommentRepository {
    async fn insert(&self, comment: &Comment) -> Result<Comment>;

    /// Comments on a note, oldest first, with author display fields
    async fn list_with_authors(&self, note_id: &NoteId) -> Result<Vec<CommentWithAuthor>>;
}

/// libSQL implementation of `CommentRepository`
pub struct LibSqlCommentRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlCommentRepository<'a> {
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_row(row: &Row) -> Result<CommentWithAuthor> {
        let comment = Comment {
            id: id_column(row, 0)?,
            note_id: id_column(row, 1)?,
            parent_id: optional_id_column(row, 2)?,
            content: row.get(3)?,
            author_id: optional_id_column(row, 4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        };

        // LEFT JOIN: author columns are NULL when the profile is gone.
        let author = match (
            optional_id_column(row, 7)?,
            optional_text(row, 8)?,
            optional_text(row, 9)?,
        ) {
            (Some(id), Some(full_name), Some(username)) => Some(AuthorSummary {
                id,
                full_name,
                username,
            }),
            _ => None,
        };

        Ok(CommentWithAuthor { comment, author })
    }
}

impl CommentRepository for LibSqlCommentRepository<'_> {
    async fn insert(&self, comment: &Comment) -> Result<Comment> {
        self.conn
            .execute(
                "INSERT INTO comments (id, note_id, parent_id, content, author_id, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                params![
                    comment.id.as_str(),
                    comment.note_id.as_str(),
                    nullable_text(comment.parent_id.map(|id| id.as_str())),
                    comment.content.clone(),
                    nullable_text(comment.author_id.map(|id| id.as_str())),
                    comment.created_at,
                    comment.updated_at
                ],
            )
            .await?;
        Ok(comment.clone())
    }

    async fn list_with_authors(&self, note_id: &NoteId) -> Result<Vec<CommentWithAuthor>> {
        let mut rows = self
            .conn
            .query(
                "SELECT c.id, c.note_id, c.parent_id, c.content, c.author_id, c.created_at, c.updated_at,
                        u.id, u.full_name, u.username
                 FROM comments c
                 LEFT JOIN users u ON u.id = c.author_id
                 WHERE c.note_id = ?
                 ORDER BY c.created_at ASC, c.id ASC",
                params![note_id.as_str()],
            )
            .await?;

        let mut comments = Vec::new();
        while let Some(row) = rows.next().await? {
            comments.push(Self::parse_row(&row)?);
        }
        Ok(comments)
    }
}
