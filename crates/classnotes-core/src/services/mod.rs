//! Client components and the database service they share.
//!
//! Each component is a headless state holder: front ends read its public
//! state and call its operations, which talk to the record store and auth
//! provider and record outcomes as banner text.

mod auth_screen;
mod dashboard;
mod database;
mod note_editor;

pub use auth_screen::{AuthMode, AuthScreen, AuthenticatedUser};
pub use dashboard::{Dashboard, Modal, ViewState, INVITE_CODE_ATTEMPTS};
pub use database::DatabaseService;
pub use note_editor::{NoteEditor, Notice};
