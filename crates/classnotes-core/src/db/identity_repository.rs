//! Credentials and session tokens for the local auth provider

use libsql::{params, Connection, Row};

use super::id_column;
use crate::error::Result;
use crate::models::UserId;

/// A stored credential row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredIdentity {
    pub id: UserId,
    pub email: String,
    /// PHC-format Argon2 hash
    pub password_hash: String,
    pub created_at: i64,
}

#[allow(async_fn_in_trait)]
pub trait IdentityRepository {
    async fn insert_identity(&self, identity: &StoredIdentity) -> Result<()>;

    /// Case-insensitive email lookup
    async fn find_identity_by_email(&self, email: &str) -> Result<Option<StoredIdentity>>;

    async fn insert_session(&self, token: &str, id: &UserId, expires_at: i64) -> Result<()>;

    /// Identity behind an unexpired token
    async fn find_session(&self, token: &str, now: i64) -> Result<Option<StoredIdentity>>;

    async fn delete_session(&self, token: &str) -> Result<bool>;
}

/// libSQL implementation of `IdentityRepository`
pub struct LibSqlIdentityRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlIdentityRepository<'a> {
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_identity(row: &Row) -> Result<StoredIdentity> {
        Ok(StoredIdentity {
            id: id_column(row, 0)?,
            email: row.get(1)?,
            password_hash: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}

impl IdentityRepository for LibSqlIdentityRepository<'_> {
    async fn insert_identity(&self, identity: &StoredIdentity) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO auth_identities (id, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
                params![
                    identity.id.as_str(),
                    identity.email.clone(),
                    identity.password_hash.clone(),
                    identity.created_at
                ],
            )
            .await?;
        Ok(())
    }

    async fn find_identity_by_email(&self, email: &str) -> Result<Option<StoredIdentity>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, email, password_hash, created_at FROM auth_identities WHERE email = ?",
                params![email.trim().to_string()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_identity(&row)?)),
            None => Ok(None),
        }
    }

    async fn insert_session(&self, token: &str, id: &UserId, expires_at: i64) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO auth_sessions (access_token, identity_id, expires_at) VALUES (?, ?, ?)",
                params![token.to_string(), id.as_str(), expires_at],
            )
            .await?;
        Ok(())
    }

    async fn find_session(&self, token: &str, now: i64) -> Result<Option<StoredIdentity>> {
        let mut rows = self
            .conn
            .query(
                "SELECT i.id, i.email, i.password_hash, i.created_at
                 FROM auth_sessions s
                 JOIN auth_identities i ON i.id = s.identity_id
                 WHERE s.access_token = ? AND s.expires_at > ?",
                params![token.to_string(), now],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_identity(&row)?)),
            None => Ok(None),
        }
    }

    async fn delete_session(&self, token: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute(
                "DELETE FROM auth_sessions WHERE access_token = ?",
                params![token.to_string()],
            )
            .await?;
        Ok(rows > 0)
    }
}
