//! Class and membership models

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::id::{ClassId, ClassMemberId, UserId};

/// Length of a class invite code
pub const INVITE_CODE_LEN: usize = 6;

const INVITE_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A group of users sharing subjects and notes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub id: ClassId,
    pub name: String,
    pub description: Option<String>,
    /// Unique join token, see [`generate_invite_code`]
    pub invite_code: String,
    pub created_by: Option<UserId>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Class {
    #[must_use]
    pub fn new(name: &str, invite_code: String, created_by: UserId) -> Self {
        let now = crate::util::now_millis();
        Self {
            id: ClassId::new(),
            name: name.trim().to_string(),
            description: None,
            invite_code,
            created_by: Some(created_by),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Role of a user within a class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Admin,
    Member,
}

impl MemberRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            other => Err(format!("unknown member role '{other}'")),
        }
    }
}

/// Link between a user and a class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMember {
    pub id: ClassMemberId,
    pub class_id: ClassId,
    pub user_id: UserId,
    pub role: MemberRole,
    pub joined_at: i64,
}

impl ClassMember {
    #[must_use]
    pub fn new(class_id: ClassId, user_id: UserId, role: MemberRole) -> Self {
        Self {
            id: ClassMemberId::new(),
            class_id,
            user_id,
            role,
            joined_at: crate::util::now_millis(),
        }
    }
}

/// Draw a 6-character invite code uniformly from `[A-Z0-9]`.
///
/// The source does not need to be cryptographic; callers inject it so tests
/// can seed it.
pub fn generate_invite_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..INVITE_CODE_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..INVITE_CODE_ALPHABET.len());
            char::from(INVITE_CODE_ALPHABET[idx])
        })
        .collect()
}

/// Normalize a typed invite code for lookup: trimmed and upper-cased.
#[must_use]
pub fn normalize_invite_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}
