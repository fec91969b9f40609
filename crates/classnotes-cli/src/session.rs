//! Per-profile session and navigation files.

use std::io::Write;
use std::path::{Path, PathBuf};

use classnotes_core::auth::{AuthError, AuthResult, AuthSession, SessionPersistence};
use classnotes_core::services::ViewState;
use classnotes_core::{ClassId, SubjectId};
use serde::{Deserialize, Serialize};

use crate::error::CliError;

const SESSION_FILE_NAME: &str = "session.json";
const STATE_FILE_NAME: &str = "state.json";

/// Where one profile keeps its files under the data directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePaths {
    pub session_file: PathBuf,
    pub state_file: PathBuf,
}

impl ProfilePaths {
    pub fn for_profile(data_dir: &Path, profile_name: &str) -> Self {
        let dir = data_dir.join("profiles").join(profile_name);
        Self {
            session_file: dir.join(SESSION_FILE_NAME),
            state_file: dir.join(STATE_FILE_NAME),
        }
    }
}

/// Auth session saved as JSON, readable only by the owner on unix
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn storage_error(path: &Path, error: &std::io::Error) -> AuthError {
    AuthError::Storage(format!("{}: {}", path.display(), error))
}

impl SessionPersistence for FileSessionStore {
    fn load_session(&self) -> AuthResult<Option<AuthSession>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(storage_error(&self.path, &error)),
        }
    }

    fn save_session(&self, session: &AuthSession) -> AuthResult<()> {
        let raw = serde_json::to_string(session)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| storage_error(parent, &error))?;
        }

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options
            .open(&self.path)
            .map_err(|error| storage_error(&self.path, &error))?;
        file.write_all(raw.as_bytes())
            .map_err(|error| storage_error(&self.path, &error))
    }

    fn clear_session(&self) -> AuthResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(storage_error(&self.path, &error)),
        }
    }
}

/// Open class and subject, remembered between invocations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    #[serde(default)]
    pub class_id: Option<ClassId>,
    #[serde(default)]
    pub subject_id: Option<SubjectId>,
}

impl NavigationState {
    pub fn from_view(view: &ViewState) -> Self {
        Self {
            class_id: view.class().map(|class| class.id),
            subject_id: view.subject().map(|subject| subject.id),
        }
    }

    pub fn load(path: &Path) -> Result<Self, CliError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Ok(serde_json::from_str(&raw).unwrap_or_else(|error| {
                tracing::warn!("Ignoring unreadable state file {}: {}", path.display(), error);
                Self::default()
            })),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(CliError::Io(error)),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), CliError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn clear(path: &Path) -> Result<(), CliError> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(CliError::Io(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classnotes_core::auth::AuthUser;
    use classnotes_core::UserId;
    use pretty_assertions::assert_eq;

    fn sample_session() -> AuthSession {
        AuthSession {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: 4_102_444_800,
            user: AuthUser {
                id: UserId::new(),
                email: Some("ada@example.com".to_string()),
            },
        }
    }

    #[test]
    fn session_file_roundtrip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ProfilePaths::for_profile(dir.path(), "default");
        let store = FileSessionStore::new(paths.session_file.clone());

        assert_eq!(store.load_session().unwrap(), None);

        let session = sample_session();
        store.save_session(&session).unwrap();
        assert_eq!(store.load_session().unwrap(), Some(session));

        store.clear_session().unwrap();
        assert_eq!(store.load_session().unwrap(), None);
        store.clear_session().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SESSION_FILE_NAME);
        FileSessionStore::new(path.clone())
            .save_session(&sample_session())
            .unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn profiles_do_not_share_files() {
        let dir = tempfile::tempdir().unwrap();
        let school = ProfilePaths::for_profile(dir.path(), "school");
        let work = ProfilePaths::for_profile(dir.path(), "work");
        assert_ne!(school.session_file, work.session_file);
        assert_ne!(school.state_file, work.state_file);
    }

    #[test]
    fn navigation_state_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STATE_FILE_NAME);
        assert_eq!(NavigationState::load(&path).unwrap(), NavigationState::default());

        let state = NavigationState {
            class_id: Some(ClassId::new()),
            subject_id: Some(SubjectId::new()),
        };
        state.save(&path).unwrap();
        assert_eq!(NavigationState::load(&path).unwrap(), state);

        NavigationState::clear(&path).unwrap();
        assert_eq!(NavigationState::load(&path).unwrap(), NavigationState::default());
    }

    #[test]
    fn corrupt_navigation_state_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STATE_FILE_NAME);
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(NavigationState::load(&path).unwrap(), NavigationState::default());
    }
}
