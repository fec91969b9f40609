//! Everything one invocation needs: profile, record store, auth provider.

use std::path::PathBuf;

use classnotes_core::auth::{
    AuthProvider, AuthResult, AuthSession, LocalAuthProvider, SessionPersistence, SignUpOutcome,
    SupabaseAuthClient,
};
use classnotes_core::config::ClientConfig;
use classnotes_core::services::{AuthenticatedUser, Dashboard, DatabaseService};

use crate::config_profiles::{default_data_dir, CliProfilesConfig};
use crate::error::CliError;
use crate::session::{FileSessionStore, NavigationState, ProfilePaths};

/// Hosted accounts when the profile configures Supabase, local ones otherwise
#[derive(Clone)]
pub enum Provider {
    Supabase(SupabaseAuthClient<FileSessionStore>),
    Local(LocalAuthProvider),
}

impl Provider {
    pub fn from_config(
        config: &ClientConfig,
        sessions: FileSessionStore,
        db: &DatabaseService,
    ) -> Result<Self, CliError> {
        let supabase = config
            .supabase()
            .map_err(|error| CliError::Config(error.to_string()))?;
        match supabase {
            Some((url, anon_key)) => SupabaseAuthClient::new(url, anon_key, sessions)
                .map(Self::Supabase)
                .map_err(|error| CliError::Config(error.to_string())),
            None => Ok(Self::Local(LocalAuthProvider::new(db.clone()))),
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Supabase(_) => "supabase",
            Self::Local(_) => "local",
        }
    }
}

impl AuthProvider for Provider {
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        match self {
            Self::Supabase(client) => client.sign_in(email, password).await,
            Self::Local(local) => local.sign_in(email, password).await,
        }
    }

    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome> {
        match self {
            Self::Supabase(client) => client.sign_up(email, password).await,
            Self::Local(local) => local.sign_up(email, password).await,
        }
    }

    async fn sign_out(&self, session: &AuthSession) -> AuthResult<()> {
        match self {
            Self::Supabase(client) => client.sign_out(session).await,
            Self::Local(local) => local.sign_out(session).await,
        }
    }
}

pub struct ClientContext {
    pub profile_name: String,
    pub paths: ProfilePaths,
    pub db: DatabaseService,
    pub provider: Provider,
    sessions: FileSessionStore,
}

impl ClientContext {
    /// Resolve the profile, merge env overrides and open the database.
    pub async fn load(
        global_profile: Option<&str>,
        db_path: Option<PathBuf>,
    ) -> Result<Self, CliError> {
        let profiles = CliProfilesConfig::load()?;
        let profile_name = profiles.resolve_profile_name(global_profile);
        let file_config = profiles
            .profile(&profile_name)
            .map(|profile| profile.client_config())
            .unwrap_or_default();
        let config = file_config
            .overlay(ClientConfig::from_env())
            .overlay(ClientConfig {
                db_path,
                ..ClientConfig::default()
            });

        let data_dir = default_data_dir()?;
        let paths = ProfilePaths::for_profile(&data_dir, &profile_name);
        let db_path = config.resolve_db_path(data_dir.as_path());
        tracing::debug!("Profile '{}' using {}", profile_name, db_path.display());
        let db = DatabaseService::open_path(db_path).await?;

        Self::new(profile_name, &config, paths, db)
    }

    pub fn new(
        profile_name: String,
        config: &ClientConfig,
        paths: ProfilePaths,
        db: DatabaseService,
    ) -> Result<Self, CliError> {
        let sessions = FileSessionStore::new(paths.session_file.clone());
        let provider = Provider::from_config(config, sessions.clone(), &db)?;
        Ok(Self {
            profile_name,
            paths,
            db,
            provider,
            sessions,
        })
    }

    pub fn stored_session(&self) -> Result<Option<AuthSession>, CliError> {
        self.sessions
            .load_session()
            .map_err(|error| CliError::Auth(error.to_string()))
    }

    pub fn save_session(&self, session: &AuthSession) -> Result<(), CliError> {
        self.sessions
            .save_session(session)
            .map_err(|error| CliError::Auth(error.to_string()))
    }

    /// Forget the saved session and the open class/subject.
    pub fn forget_session(&self) -> Result<(), CliError> {
        self.sessions
            .clear_session()
            .map_err(|error| CliError::Auth(error.to_string()))?;
        NavigationState::clear(&self.paths.state_file)
    }

    /// The user behind the saved session, if it is still valid.
    pub async fn current_user(&self) -> Result<Option<AuthenticatedUser>, CliError> {
        let session = match &self.provider {
            Provider::Supabase(client) => client
                .restore_session()
                .await
                .map_err(|error| CliError::Auth(error.to_string()))?,
            Provider::Local(local) => {
                let Some(session) = self.stored_session()? else {
                    return Ok(None);
                };
                let valid = local
                    .session_user(&session.access_token)
                    .await
                    .map_err(|error| CliError::Auth(error.to_string()))?;
                if valid.is_none() {
                    tracing::info!("Saved session for '{}' has expired", self.profile_name);
                    self.forget_session()?;
                    return Ok(None);
                }
                Some(session)
            }
        };

        Ok(session.map(|session| AuthenticatedUser {
            user_id: session.user.id,
            email: session.user.email.clone().unwrap_or_default(),
            session: Some(session),
        }))
    }

    pub async fn require_user(&self) -> Result<AuthenticatedUser, CliError> {
        self.current_user().await?.ok_or(CliError::NotSignedIn)
    }

    /// Signed-in dashboard with the remembered class and subject reopened.
    pub async fn dashboard(&self) -> Result<Dashboard, CliError> {
        let user = self.require_user().await?;
        let mut dashboard = Dashboard::new(user);
        dashboard.load(&self.db).await?;
        let state = NavigationState::load(&self.paths.state_file)?;
        restore_navigation(&mut dashboard, &self.db, &state).await?;
        Ok(dashboard)
    }

    pub fn remember_view(&self, dashboard: &Dashboard) -> Result<(), CliError> {
        NavigationState::from_view(dashboard.view()).save(&self.paths.state_file)
    }
}

/// Reopen a remembered class and subject. Ids that no longer resolve among
/// the user's classes or the class's subjects are dropped.
pub async fn restore_navigation(
    dashboard: &mut Dashboard,
    db: &DatabaseService,
    state: &NavigationState,
) -> Result<(), CliError> {
    let Some(class) = state
        .class_id
        .and_then(|id| dashboard.classes.iter().find(|class| class.id == id).cloned())
    else {
        return Ok(());
    };
    dashboard.select_class(db, class).await?;

    if let Some(subject) = state.subject_id.and_then(|id| {
        dashboard
            .subjects
            .iter()
            .find(|subject| subject.id == id)
            .cloned()
    }) {
        dashboard.select_subject(db, subject).await?;
    }
    Ok(())
}
