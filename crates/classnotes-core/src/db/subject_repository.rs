//! Subject repository

use libsql::{params, Connection, Row};

use super::{id_column, nullable_text, optional_id_column, optional_text};
use crate::error::Result;
use crate::models::{ClassId, Subject, SubjectId};

const SUBJECT_COLUMNS: &str =
    "id, name, description, class_id, color, icon, created_by, created_at, updated_at";

/// Storage operations on `subjects`
#[allow(async_fn_in_trait)]
pub trait SubjectRepository {
    async fn insert(&self, subject: &Subject) -> Result<Subject>;

    async fn get(&self, id: &SubjectId) -> Result<Option<Subject>>;

    /// Subjects of a class, newest first
    async fn list_by_class(&self, class_id: &ClassId) -> Result<Vec<Subject>>;
}

/// libSQL implementation of `SubjectRepository`
pub struct LibSqlSubjectRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlSubjectRepository<'a> {
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_subject(row: &Row) -> Result<Subject> {
        Ok(Subject {
            id: id_column(row, 0)?,
            name: row.get(1)?,
            description: optional_text(row, 2)?,
            class_id: id_column(row, 3)?,
            color: row.get(4)?,
            icon: row.get(5)?,
            created_by: optional_id_column(row, 6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }
}

impl SubjectRepository for LibSqlSubjectRepository<'_> {
    async fn insert(&self, subject: &Subject) -> Result<Subject> {
        self.conn
            .execute(
                "INSERT INTO subjects (id, name, description, class_id, color, icon, created_by, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    subject.id.as_str(),
                    subject.name.clone(),
                    nullable_text(subject.description.clone()),
                    subject.class_id.as_str(),
                    subject.color.clone(),
                    subject.icon.clone(),
                    nullable_text(subject.created_by.map(|id| id.as_str())),
                    subject.created_at,
                    subject.updated_at
                ],
            )
            .await?;
        Ok(subject.clone())
    }

    async fn get(&self, id: &SubjectId) -> Result<Option<Subject>> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = ?"),
                params![id.as_str()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_subject(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_by_class(&self, class_id: &ClassId) -> Result<Vec<Subject>> {
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT {SUBJECT_COLUMNS} FROM subjects WHERE class_id = ?
                     ORDER BY created_at DESC, id DESC"
                ),
                params![class_id.as_str()],
            )
            .await?;

        let mut subjects = Vec::new();
        while let Some(row) = rows.next().await? {
            subjects.push(Self::parse_subject(&row)?);
        }
        Ok(subjects)
    }
}
