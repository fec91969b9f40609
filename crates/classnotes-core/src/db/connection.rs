//! Database connection management

use crate::error::Result;
use libsql::{Builder, Connection, Database as LibSqlDatabase};
use std::path::Path;

use super::migrations;

const MEMORY_PATH: &str = ":memory:";

/// The record store: one libSQL connection with the schema migrated
pub struct Database {
    #[allow(dead_code)]
    db: LibSqlDatabase,
    conn: Connection,
}

impl Database {
    /// Open (or create) the database file at `path` and bring its schema up
    /// to date.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_local(&path.as_ref().to_string_lossy()).await
    }

    /// Fresh in-memory store, used by tests and throwaway sessions
    pub async fn open_in_memory() -> Result<Self> {
        Self::open_local(MEMORY_PATH).await
    }

    async fn open_local(path: &str) -> Result<Self> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        let database = Self { db, conn };
        database.configure(path == MEMORY_PATH).await?;
        migrations::run(&database.conn).await?;
        Ok(database)
    }

    async fn configure(&self, in_memory: bool) -> Result<()> {
        if !in_memory {
            // journal_mode answers with a row, so it must go through query
            let mut rows = self.conn.query("PRAGMA journal_mode = WAL", ()).await?;
            while rows.next().await?.is_some() {}
            self.conn.execute("PRAGMA synchronous = NORMAL", ()).await?;
        }
        self.conn.execute("PRAGMA foreign_keys = ON", ()).await?;
        Ok(())
    }

    pub const fn connection(&self) -> &Connection {
        &self.conn
    }
}
