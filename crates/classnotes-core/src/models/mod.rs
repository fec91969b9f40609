//! Data models for classnotes

mod class;
mod comment;
mod history;
mod id;
mod note;
mod share;
mod subject;
mod user;

pub use class::{
    generate_invite_code, normalize_invite_code, Class, ClassMember, MemberRole, INVITE_CODE_LEN,
};
pub use comment::{Comment, CommentThread, CommentThreads, CommentWithAuthor};
pub use history::{EditHistory, EditHistoryEntry, HISTORY_LIMIT};
pub use id::{
    ClassId, ClassMemberId, CommentId, EditHistoryId, NoteId, NoteImageId, NoteShareId,
    NoteUrlId, SubjectId, UserId,
};
pub use note::{placeholder_image_url, Note, NoteImage, NoteUrl};
pub use share::{NoteShare, ShareType};
pub use subject::{random_appearance, Subject, SUBJECT_COLORS, SUBJECT_ICONS};
pub use user::{normalize_username, AuthorSummary, User};
