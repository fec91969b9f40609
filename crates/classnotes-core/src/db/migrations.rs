//! Database migrations

use crate::error::Result;
use libsql::Connection;

/// Current schema version
const CURRENT_VERSION: i32 = 2;

/// Run all pending migrations
pub async fn run(conn: &Connection) -> Result<()> {
    let version = get_version(conn).await?;

    if version < 1 {
        migrate_v1(conn).await?;
    }
    if version < 2 {
        migrate_v2(conn).await?;
    }

    Ok(())
}

/// Get the current schema version
async fn get_version(conn: &Connection) -> Result<i32> {
    let mut rows = conn
        .query(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            (),
        )
        .await?;

    let exists: bool = if let Some(row) = rows.next().await? {
        row.get::<i32>(0)? != 0
    } else {
        false
    };

    if !exists {
        return Ok(0);
    }

    let mut rows = conn
        .query("SELECT COALESCE(MAX(version), 0) FROM schema_version", ())
        .await?;

    let version: i32 = if let Some(row) = rows.next().await? {
        row.get(0)?
    } else {
        0
    };

    Ok(version)
}

async fn apply(conn: &Connection, version: i32, statements: &[&str]) -> Result<()> {
    conn.execute("BEGIN TRANSACTION", ()).await?;

    for stmt in statements {
        if let Err(e) = conn.execute(stmt, ()).await {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }
    }

    if let Err(e) = conn
        .execute("INSERT INTO schema_version (version) VALUES (?)", libsql::params![version])
        .await
    {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e.into());
    }

    if let Err(e) = conn.execute("COMMIT", ()).await {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e.into());
    }

    tracing::info!("Migrated database to version {version}");
    Ok(())
}

/// Migration to version 1: record collections
async fn migrate_v1(conn: &Connection) -> Result<()> {
    let statements = [
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            full_name TEXT NOT NULL,
            username TEXT NOT NULL UNIQUE,
            avatar_url TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            last_login INTEGER
        )",
        "CREATE TABLE IF NOT EXISTS classes (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            invite_code TEXT NOT NULL UNIQUE,
            created_by TEXT REFERENCES users(id) ON DELETE SET NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS class_members (
            id TEXT PRIMARY KEY,
            class_id TEXT NOT NULL REFERENCES classes(id) ON DELETE CASCADE,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            role TEXT NOT NULL CHECK (role IN ('admin', 'member')),
            joined_at INTEGER NOT NULL,
            UNIQUE (class_id, user_id)
        )",
        "CREATE INDEX IF NOT EXISTS idx_class_members_user ON class_members(user_id)",
        "CREATE TABLE IF NOT EXISTS subjects (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            class_id TEXT NOT NULL REFERENCES classes(id) ON DELETE CASCADE,
            color TEXT NOT NULL,
            icon TEXT NOT NULL,
            created_by TEXT REFERENCES users(id) ON DELETE SET NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_subjects_class ON subjects(class_id, created_at DESC)",
        "CREATE TABLE IF NOT EXISTS notes (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL DEFAULT '',
            subject_id TEXT NOT NULL REFERENCES subjects(id) ON DELETE CASCADE,
            author_id TEXT REFERENCES users(id) ON DELETE SET NULL,
            is_public INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_notes_subject ON notes(subject_id, updated_at DESC)",
        "CREATE TABLE IF NOT EXISTS note_images (
            id TEXT PRIMARY KEY,
            note_id TEXT NOT NULL REFERENCES notes(id) ON DELETE CASCADE,
            image_url TEXT NOT NULL,
            caption TEXT,
            uploaded_by TEXT REFERENCES users(id) ON DELETE SET NULL,
            uploaded_at INTEGER NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_note_images_note ON note_images(note_id)",
        "CREATE TABLE IF NOT EXISTS note_urls (
            id TEXT PRIMARY KEY,
            note_id TEXT NOT NULL REFERENCES notes(id) ON DELETE CASCADE,
            url TEXT NOT NULL,
            title TEXT,
            added_by TEXT REFERENCES users(id) ON DELETE SET NULL,
            added_at INTEGER NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_note_urls_note ON note_urls(note_id)",
        "CREATE TABLE IF NOT EXISTS comments (
            id TEXT PRIMARY KEY,
            note_id TEXT NOT NULL REFERENCES notes(id) ON DELETE CASCADE,
            parent_id TEXT REFERENCES comments(id) ON DELETE CASCADE,
            content TEXT NOT NULL,
            author_id TEXT REFERENCES users(id) ON DELETE SET NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_comments_note ON comments(note_id, created_at)",
        "CREATE TABLE IF NOT EXISTS edit_history (
            id TEXT PRIMARY KEY,
            note_id TEXT NOT NULL REFERENCES notes(id) ON DELETE CASCADE,
            edited_by TEXT REFERENCES users(id) ON DELETE SET NULL,
            content_before TEXT,
            content_after TEXT,
            edited_at INTEGER NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_edit_history_note ON edit_history(note_id, edited_at DESC)",
        "CREATE TABLE IF NOT EXISTS note_shares (
            id TEXT PRIMARY KEY,
            note_id TEXT NOT NULL REFERENCES notes(id) ON DELETE CASCADE,
            shared_by TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            shared_with_user TEXT REFERENCES users(id) ON DELETE CASCADE,
            shared_with_class TEXT REFERENCES classes(id) ON DELETE CASCADE,
            share_type TEXT NOT NULL CHECK (share_type IN ('view', 'edit')),
            shared_at INTEGER NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_note_shares_note ON note_shares(note_id)",
    ];

    apply(conn, 1, &statements).await
}

/// Migration to version 2: local auth identities and sessions
async fn migrate_v2(conn: &Connection) -> Result<()> {
    let statements = [
        "CREATE TABLE IF NOT EXISTS auth_identities (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE COLLATE NOCASE,
            password_hash TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS auth_sessions (
            access_token TEXT PRIMARY KEY,
            identity_id TEXT NOT NULL REFERENCES auth_identities(id) ON DELETE CASCADE,
            expires_at INTEGER NOT NULL
        )",
    ];

    apply(conn, CURRENT_VERSION, &statements).await
}
