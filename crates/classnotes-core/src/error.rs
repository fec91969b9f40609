//! Error types for classnotes-core

use thiserror::Error;

use crate::auth::AuthError;

/// Result type alias using classnotes-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in classnotes-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input, caught before any store call
    #[error("{0}")]
    InvalidInput(String),

    /// A record conflicts with existing state (duplicate membership, taken email)
    #[error("{0}")]
    Conflict(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Auth provider error
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl Error {
    /// Whether this error is a unique-constraint violation reported by the store.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::LibSql(error) => error.to_string().contains("UNIQUE constraint failed"),
            Self::Database(message) => message.contains("UNIQUE constraint failed"),
            _ => false,
        }
    }
}
