pub mod attachments;
pub mod auth_cmd;
pub mod class;
pub mod comment;
pub mod common;
pub mod completions;
pub mod config;
pub mod navigation;
pub mod note;
pub mod share;
pub mod subject;
