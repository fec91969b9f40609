//! Class and membership repository

use libsql::{params, Connection, Row};

use super::{begin, commit, id_column, nullable_text, optional_id_column, optional_text, rollback};
use crate::error::{Error, Result};
use crate::models::{Class, ClassId, ClassMember, MemberRole, UserId};

const CLASS_COLUMNS: &str =
    "c.id, c.name, c.description, c.invite_code, c.created_by, c.created_at, c.updated_at";

const MEMBER_COLUMNS: &str = "id, class_id, user_id, role, joined_at";

/// Storage operations on `classes` and `class_members`
#[allow(async_fn_in_trait)]
pub trait ClassRepository {
    /// Insert a class row
    async fn insert(&self, class: &Class) -> Result<Class>;

    /// Insert a class and its creator's admin membership in one transaction
    async fn create_with_admin(&self, class: &Class) -> Result<(Class, ClassMember)>;

    /// Get a class by id
    async fn get(&self, id: &ClassId) -> Result<Option<Class>>;

    /// Find a class by exact invite code
    async fn find_by_invite_code(&self, code: &str) -> Result<Option<Class>>;

    /// Classes the user belongs to, newest first
    async fn list_for_member(&self, user_id: &UserId) -> Result<Vec<Class>>;

    /// Insert a membership row
    async fn insert_member(&self, member: &ClassMember) -> Result<ClassMember>;

    /// Membership of a user in a class, if any
    async fn find_member(&self, class_id: &ClassId, user_id: &UserId)
        -> Result<Option<ClassMember>>;

    /// All memberships of a class, oldest first
    async fn list_members(&self, class_id: &ClassId) -> Result<Vec<ClassMember>>;
}

/// libSQL implementation of `ClassRepository`
pub struct LibSqlClassRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlClassRepository<'a> {
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_class(row: &Row) -> Result<Class> {
        Ok(Class {
            id: id_column(row, 0)?,
            name: row.get(1)?,
            description: optional_text(row, 2)?,
            invite_code: row.get(3)?,
            created_by: optional_id_column(row, 4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn parse_member(row: &Row) -> Result<ClassMember> {
        let role: String = row.get(3)?;
        Ok(ClassMember {
            id: id_column(row, 0)?,
            class_id: id_column(row, 1)?,
            user_id: id_column(row, 2)?,
            role: role.parse::<MemberRole>().map_err(Error::Database)?,
            joined_at: row.get(4)?,
        })
    }

    async fn query_class(&self, sql: &str, value: String) -> Result<Option<Class>> {
        let mut rows = self.conn.query(sql, params![value]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_class(&row)?)),
            None => Ok(None),
        }
    }
}

impl ClassRepository for LibSqlClassRepository<'_> {
    async fn insert(&self, class: &Class) -> Result<Class> {
        self.conn
            .execute(
                "INSERT INTO classes (id, name, description, invite_code, created_by, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                params![
                    class.id.as_str(),
                    class.name.clone(),
                    nullable_text(class.description.clone()),
                    class.invite_code.clone(),
                    nullable_text(class.created_by.map(|id| id.as_str())),
                    class.created_at,
                    class.updated_at
                ],
            )
            .await?;
        Ok(class.clone())
    }

    async fn create_with_admin(&self, class: &Class) -> Result<(Class, ClassMember)> {
        let creator = class
            .created_by
            .ok_or_else(|| Error::InvalidInput("A class needs a creator".to_string()))?;
        let member = ClassMember::new(class.id, creator, MemberRole::Admin);

        begin(self.conn).await?;
        let inserted = match self.insert(class).await {
            Ok(_) => self.insert_member(&member).await,
            Err(error) => Err(error),
        };
        if let Err(error) = inserted {
            rollback(self.conn).await;
            return Err(error);
        }
        commit(self.conn).await?;

        tracing::info!("Created class {} ({})", class.id, class.invite_code);
        Ok((class.clone(), member))
    }

    async fn get(&self, id: &ClassId) -> Result<Option<Class>> {
        self.query_class(
            &format!("SELECT {CLASS_COLUMNS} FROM classes c WHERE c.id = ?"),
            id.as_str(),
        )
        .await
    }

    async fn find_by_invite_code(&self, code: &str) -> Result<Option<Class>> {
        self.query_class(
            &format!("SELECT {CLASS_COLUMNS} FROM classes c WHERE c.invite_code = ?"),
            code.to_string(),
        )
        .await
    }

    async fn list_for_member(&self, user_id: &UserId) -> Result<Vec<Class>> {
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT {CLASS_COLUMNS}
                     FROM classes c
                     JOIN class_members m ON m.class_id = c.id
                     WHERE m.user_id = ?
                     ORDER BY c.created_at DESC, c.id DESC"
                ),
                params![user_id.as_str()],
            )
            .await?;

        let mut classes = Vec::new();
        while let Some(row) = rows.next().await? {
            classes.push(Self::parse_class(&row)?);
        }
        Ok(classes)
    }

    async fn insert_member(&self, member: &ClassMember) -> Result<ClassMember> {
        self.conn
            .execute(
                "INSERT INTO class_members (id, class_id, user_id, role, joined_at) VALUES (?, ?, ?, ?, ?)",
                params![
                    member.id.as_str(),
                    member.class_id.as_str(),
                    member.user_id.as_str(),
                    member.role.as_str(),
                    member.joined_at
                ],
            )
            .await?;
        Ok(member.clone())
    }

    async fn find_member(
        &self,
        class_id: &ClassId,
        user_id: &UserId,
    ) -> Result<Option<ClassMember>> {
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT {MEMBER_COLUMNS} FROM class_members WHERE class_id = ? AND user_id = ?"
                ),
                params![class_id.as_str(), user_id.as_str()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_member(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_members(&self, class_id: &ClassId) -> Result<Vec<ClassMember>> {
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT {MEMBER_COLUMNS} FROM class_members WHERE class_id = ? ORDER BY joined_at, id"
                ),
                params![class_id.as_str()],
            )
            .await?;

        let mut members = Vec::new();
        while let Some(row) = rows.next().await? {
            members.push(Self::parse_member(&row)?);
        }
        Ok(members)
    }
}
