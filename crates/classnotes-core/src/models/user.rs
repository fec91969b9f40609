//! User profile model

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// A user profile, keyed by the auth identity's id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    /// Lower-cased, whitespace-stripped handle
    pub username: String,
    pub avatar_url: Option<String>,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
    /// Last successful sign-in (Unix ms)
    pub last_login: Option<i64>,
}

impl User {
    /// Build a fresh profile for a newly signed-up identity.
    #[must_use]
    pub fn new(id: UserId, email: &str, full_name: &str, username: &str) -> Self {
        let now = crate::util::now_millis();
        Self {
            id,
            email: email.trim().to_string(),
            full_name: full_name.trim().to_string(),
            username: normalize_username(username),
            avatar_url: None,
            created_at: now,
            updated_at: now,
            last_login: None,
        }
    }

    /// Name to greet the user with: full name, falling back to email.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.email
        } else {
            &self.full_name
        }
    }
}

/// Author fields joined onto comments and history rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: UserId,
    pub full_name: String,
    pub username: String,
}

/// Lower-case a username and strip every whitespace character from it.
#[must_use]
pub fn normalize_username(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_is_lowercased_and_stripped() {
        assert_eq!(normalize_username("  Jane Doe\t"), "janedoe");
        assert_eq!(normalize_username("MiXeD"), "mixed");
    }

    #[test]
    fn new_user_normalizes_username() {
        let user = User::new(UserId::new(), "jane@example.com", "Jane Doe", "Jane D");
        assert_eq!(user.username, "janed");
        assert!(user.last_login.is_none());
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let mut user = User::new(UserId::new(), "jane@example.com", "", "jane");
        assert_eq!(user.display_name(), "jane@example.com");
        user.full_name = "Jane".to_string();
        assert_eq!(user.display_name(), "Jane");
    }
}
