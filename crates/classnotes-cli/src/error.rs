use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] classnotes_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No note content provided")]
    EmptyContent,
    #[error("{0} cannot be empty")]
    EmptyArgument(&'static str),
    #[error("Note not found for id/prefix: {0}")]
    NoteNotFound(String),
    #[error("Class not found: {0}. Run `classnotes class list` to see your classes.")]
    ClassNotFound(String),
    #[error("Subject not found: {0}. Run `classnotes subject list` to see subjects.")]
    SubjectNotFound(String),
    #[error("{0}")]
    Ambiguous(String),
    #[error("No class is open. Run `classnotes class open <class>` first.")]
    NoClassOpen,
    #[error("No subject is open. Run `classnotes subject open <subject>` first.")]
    NoSubjectOpen,
    #[error("Not signed in. Run `classnotes auth login` first.")]
    NotSignedIn,
    #[error("Selection does not match the note content")]
    InvalidSelection,
    #[error("{0}")]
    Rejected(String),
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Authentication error: {0}")]
    Auth(String),
}
