//! classnotes-core - Core library for classnotes
//!
//! This crate contains the shared models, record store, auth providers and the
//! headless client components (auth screen, dashboard, note editor) used by
//! every classnotes front end.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod markdown;
pub mod models;
pub mod services;
pub mod util;

pub use error::{Error, Result};
pub use models::{
    Class, ClassId, ClassMember, Comment, CommentId, EditHistory, MemberRole, Note, NoteId,
    NoteImage, NoteShare, NoteUrl, ShareType, Subject, SubjectId, User, UserId,
};
