//! Record store for classnotes
//!
//! One libSQL database holds every collection. Repositories borrow a
//! connection and expose the select / insert / update operations the client
//! components need.

mod class_repository;
mod comment_repository;
mod connection;
mod identity_repository;
mod migrations;
mod note_repository;
mod subject_repository;
mod user_repository;

pub use class_repository::{ClassRepository, LibSqlClassRepository};
pub use comment_repository::{CommentRepository, LibSqlCommentRepository};
pub use connection::Database;
pub use identity_repository::{IdentityRepository, LibSqlIdentityRepository, StoredIdentity};
pub use note_repository::{LibSqlNoteRepository, NoteRepository};
pub use subject_repository::{LibSqlSubjectRepository, SubjectRepository};
pub use user_repository::{LibSqlUserRepository, UserRepository};

use std::str::FromStr;

use libsql::{Connection, Row, Value};

use crate::error::{Error, Result};

/// Bind an optional string, mapping `None` to SQL NULL.
pub(crate) fn nullable_text(value: Option<String>) -> Value {
    value.map_or(Value::Null, Value::Text)
}

/// Bind an optional integer, mapping `None` to SQL NULL.
pub(crate) fn nullable_integer(value: Option<i64>) -> Value {
    value.map_or(Value::Null, Value::Integer)
}

/// Read a nullable TEXT column.
pub(crate) fn optional_text(row: &Row, idx: i32) -> Result<Option<String>> {
    match row.get_value(idx)? {
        Value::Null => Ok(None),
        Value::Text(text) => Ok(Some(text)),
        other => Err(Error::Database(format!(
            "expected TEXT in column {idx}, found {other:?}"
        ))),
    }
}

/// Read a nullable INTEGER column.
pub(crate) fn optional_integer(row: &Row, idx: i32) -> Result<Option<i64>> {
    match row.get_value(idx)? {
        Value::Null => Ok(None),
        Value::Integer(value) => Ok(Some(value)),
        other => Err(Error::Database(format!(
            "expected INTEGER in column {idx}, found {other:?}"
        ))),
    }
}

/// Read a required id column.
pub(crate) fn id_column<T: FromStr>(row: &Row, idx: i32) -> Result<T> {
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|_| Error::Database(format!("invalid id '{raw}' in column {idx}")))
}

/// Read a nullable id column.
pub(crate) fn optional_id_column<T: FromStr>(row: &Row, idx: i32) -> Result<Option<T>> {
    optional_text(row, idx)?
        .map(|raw| {
            raw.parse()
                .map_err(|_| Error::Database(format!("invalid id '{raw}' in column {idx}")))
        })
        .transpose()
}

pub(crate) async fn begin(conn: &Connection) -> Result<()> {
    conn.execute("BEGIN TRANSACTION", ()).await?;
    Ok(())
}

pub(crate) async fn commit(conn: &Connection) -> Result<()> {
    if let Err(e) = conn.execute("COMMIT", ()).await {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e.into());
    }
    Ok(())
}

pub(crate) async fn rollback(conn: &Connection) {
    conn.execute("ROLLBACK", ()).await.ok();
}
