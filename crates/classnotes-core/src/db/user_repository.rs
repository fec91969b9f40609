//! User profile repository

use libsql::{params, Connection, Row};

use super::{id_column, nullable_integer, nullable_text, optional_integer, optional_text};
use crate::error::{Error, Result};
use crate::models::{User, UserId};

const USERNAME_TAKEN: &str = "Username is already taken";

const USER_COLUMNS: &str =
    "id, email, full_name, username, avatar_url, created_at, updated_at, last_login";

/// Storage operations on the `users` collection
#[allow(async_fn_in_trait)]
pub trait UserRepository {
    /// Insert a profile and return it as stored
    async fn insert(&self, user: &User) -> Result<User>;

    /// Get a profile by id
    async fn get(&self, id: &UserId) -> Result<Option<User>>;

    /// Find a profile by exact email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Find a profile by its normalized username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Stamp `last_login`; returns whether a profile was updated
    async fn touch_last_login(&self, id: &UserId, at: i64) -> Result<bool>;
}

/// libSQL implementation of `UserRepository`
pub struct LibSqlUserRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlUserRepository<'a> {
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_user(row: &Row) -> Result<User> {
        Ok(User {
            id: id_column(row, 0)?,
            email: row.get(1)?,
            full_name: row.get(2)?,
            username: row.get(3)?,
            avatar_url: optional_text(row, 4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
            last_login: optional_integer(row, 7)?,
        })
    }

    async fn query_one(&self, sql: &str, value: String) -> Result<Option<User>> {
        let mut rows = self.conn.query(sql, params![value]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_user(&row)?)),
            None => Ok(None),
        }
    }
}

impl UserRepository for LibSqlUserRepository<'_> {
    async fn insert(&self, user: &User) -> Result<User> {
        let inserted = self
            .conn
            .execute(
                "INSERT INTO users (id, email, full_name, username, avatar_url, created_at, updated_at, last_login)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    user.id.as_str(),
                    user.email.clone(),
                    user.full_name.clone(),
                    user.username.clone(),
                    nullable_text(user.avatar_url.clone()),
                    user.created_at,
                    user.updated_at,
                    nullable_integer(user.last_login)
                ],
            )
            .await;
        if let Err(error) = inserted {
            if error.to_string().contains("users.username") {
                return Err(Error::Conflict(USERNAME_TAKEN.to_string()));
            }
            return Err(error.into());
        }
        tracing::debug!("Inserted profile {}", user.id);
        Ok(user.clone())
    }

    async fn get(&self, id: &UserId) -> Result<Option<User>> {
        self.query_one(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"),
            id.as_str(),
        )
        .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.query_one(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"),
            email.to_string(),
        )
        .await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        self.query_one(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"),
            username.to_string(),
        )
        .await
    }

    async fn touch_last_login(&self, id: &UserId, at: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute(
                "UPDATE users SET last_login = ?, updated_at = ? WHERE id = ?",
                params![at, at, id.as_str()],
            )
            .await?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use pretty_assertions::assert_eq;

    #[tokio::test(flavor = "multi_thread")]
    async fn insert_and_get_round_trip() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlUserRepository::new(db.connection());

        let user = User::new(UserId::new(), "ada@example.com", "Ada Lovelace", "Ada");
        repo.insert(&user).await.unwrap();

        let fetched = repo.get(&user.id).await.unwrap().unwrap();
        assert_eq!(fetched, user);
        assert_eq!(fetched.username, "ada");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn find_by_email_is_exact() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlUserRepository::new(db.connection());

        let user = User::new(UserId::new(), "ada@example.com", "Ada", "ada");
        repo.insert(&user).await.unwrap();

        assert!(repo.find_by_email("ada@example.com").await.unwrap().is_some());
        assert!(repo.find_by_email("ada@example").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn duplicate_email_is_rejected() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlUserRepository::new(db.connection());

        repo.insert(&User::new(UserId::new(), "a@example.com", "A", "a"))
            .await
            .unwrap();
        let error = repo
            .insert(&User::new(UserId::new(), "a@example.com", "B", "b"))
            .await
            .unwrap_err();
        assert!(error.is_unique_violation());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn taken_username_is_a_conflict() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlUserRepository::new(db.connection());

        repo.insert(&User::new(UserId::new(), "a@example.com", "A", "ada"))
            .await
            .unwrap();
        assert!(repo.find_by_username("ada").await.unwrap().is_some());

        let error = repo
            .insert(&User::new(UserId::new(), "b@example.com", "B", "Ada"))
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Conflict(_)));
        assert_eq!(error.to_string(), USERNAME_TAKEN);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn touch_last_login_sets_timestamp() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlUserRepository::new(db.connection());

        let user = User::new(UserId::new(), "a@example.com", "A", "a");
        repo.insert(&user).await.unwrap();

        assert!(repo.touch_last_login(&user.id, 1_234).await.unwrap());
        let fetched = repo.get(&user.id).await.unwrap().unwrap();
        assert_eq!(fetched.last_login, Some(1_234));

        assert!(!repo.touch_last_login(&UserId::new(), 1).await.unwrap());
    }
}
