//! Login / sign-up screen state.

use serde::{Deserialize, Serialize};

use super::DatabaseService;
use crate::auth::{AuthProvider, AuthSession, SignUpOutcome, MIN_PASSWORD_LEN};
use crate::models::{normalize_username, User, UserId};
use crate::util::{now_millis, single_line};

const FILL_ALL_FIELDS: &str = "Please fill in all fields";
const USERNAME_TAKEN: &str = "Username is already taken";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthMode {
    #[default]
    Login,
    SignUp,
}

/// The signed-in user handed to the dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub email: String,
    /// Absent when sign-up still awaits email confirmation
    pub session: Option<AuthSession>,
}

#[derive(Debug, Clone, Default)]
pub struct AuthScreen {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub username: String,
    error: Option<String>,
    success: Option<String>,
    loading: bool,
}

impl AuthScreen {
    #[must_use]
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Form in `mode` with the credentials already typed in.
    #[must_use]
    pub fn with_credentials(
        mode: AuthMode,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            ..Self::new(mode)
        }
    }

    /// Sign-up form with every field filled.
    #[must_use]
    pub fn sign_up_form(
        email: impl Into<String>,
        password: impl Into<String>,
        full_name: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            username: username.into(),
            ..Self::with_credentials(AuthMode::SignUp, email, password)
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Switch tabs. Typed fields survive; both banners are cleared.
    pub fn switch_mode(&mut self, mode: AuthMode) {
        self.mode = mode;
        self.error = None;
        self.success = None;
    }

    /// Validate and submit the form in the current mode.
    pub async fn submit<P: AuthProvider>(
        &mut self,
        provider: &P,
        db: &DatabaseService,
    ) -> Option<AuthenticatedUser> {
        self.error = None;
        self.success = None;

        if let Err(message) = self.validate() {
            self.error = Some(message);
            return None;
        }

        self.loading = true;
        let result = match self.mode {
            AuthMode::Login => self.login(provider, db).await,
            AuthMode::SignUp => self.sign_up(provider, db).await,
        };
        self.loading = false;

        match result {
            Ok(user) => Some(user),
            Err(message) => {
                tracing::debug!("Auth submit failed: {}", message);
                self.error = Some(single_line(&message));
                None
            }
        }
    }

    pub async fn sign_out<P: AuthProvider>(&mut self, provider: &P, session: &AuthSession) {
        self.error = None;
        self.success = None;
        if let Err(error) = provider.sign_out(session).await {
            self.error = Some(single_line(&error.to_string()));
        }
    }

    fn validate(&self) -> Result<(), String> {
        let mut required = vec![self.email.trim(), self.password.as_str()];
        if self.mode == AuthMode::SignUp {
            required.push(self.full_name.trim());
            required.push(self.username.trim());
        }
        if required.iter().any(|value| value.is_empty()) {
            return Err(FILL_ALL_FIELDS.to_string());
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            ));
        }
        Ok(())
    }

    async fn login<P: AuthProvider>(
        &mut self,
        provider: &P,
        db: &DatabaseService,
    ) -> Result<AuthenticatedUser, String> {
        let session = provider
            .sign_in(self.email.trim(), &self.password)
            .await
            .map_err(|error| error.to_string())?;

        db.touch_last_login(&session.user.id, now_millis())
            .await
            .map_err(|error| error.to_string())?;

        self.success = Some("Login successful!".to_string());
        Ok(AuthenticatedUser {
            user_id: session.user.id,
            email: session
                .user
                .email
                .clone()
                .unwrap_or_else(|| self.email.trim().to_string()),
            session: Some(session),
        })
    }

    async fn sign_up<P: AuthProvider>(
        &mut self,
        provider: &P,
        db: &DatabaseService,
    ) -> Result<AuthenticatedUser, String> {
        let email = self.email.trim().to_string();
        let username = normalize_username(&self.username);
        let taken = db
            .find_user_by_username(&username)
            .await
            .map_err(|error| error.to_string())?;
        if taken.is_some() {
            return Err(USERNAME_TAKEN.to_string());
        }

        let outcome = provider
            .sign_up(&email, &self.password)
            .await
            .map_err(|error| error.to_string())?;

        let profile = User::new(
            outcome.user().id,
            &email,
            self.full_name.trim(),
            &username,
        );
        db.insert_user(&profile)
            .await
            .map_err(|error| error.to_string())?;
        tracing::info!("Created profile {} for {}", profile.id, profile.username);

        let (message, session) = match outcome {
            SignUpOutcome::SignedIn(session) => ("Account created! Welcome!", Some(session)),
            SignUpOutcome::ConfirmationRequired(_) => (
                "Account created! Check your email to confirm your address.",
                None,
            ),
        };
        self.success = Some(message.to_string());
        Ok(AuthenticatedUser {
            user_id: profile.id,
            email,
            session,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthError, AuthResult, AuthUser, LocalAuthProvider};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider that counts calls and fails every one of them
    #[derive(Default)]
    struct FailingProvider {
        calls: AtomicUsize,
    }

    impl AuthProvider for FailingProvider {
        async fn sign_in(&self, _: &str, _: &str) -> AuthResult<AuthSession> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(AuthError::Api("Invalid login credentials".to_string()))
        }

        async fn sign_up(&self, _: &str, _: &str) -> AuthResult<SignUpOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(AuthError::Api("Signups not allowed".to_string()))
        }

        async fn sign_out(&self, _: &AuthSession) -> AuthResult<()> {
            Ok(())
        }
    }

    /// Provider that always asks for email confirmation
    struct ConfirmingProvider;

    impl AuthProvider for ConfirmingProvider {
        async fn sign_in(&self, _: &str, _: &str) -> AuthResult<AuthSession> {
            Err(AuthError::Api("Email not confirmed".to_string()))
        }

        async fn sign_up(&self, email: &str, _: &str) -> AuthResult<SignUpOutcome> {
            Ok(SignUpOutcome::ConfirmationRequired(AuthUser {
                id: UserId::new(),
                email: Some(email.to_string()),
            }))
        }

        async fn sign_out(&self, _: &AuthSession) -> AuthResult<()> {
            Ok(())
        }
    }

    fn ada_sign_up(email: &str) -> AuthScreen {
        AuthScreen::sign_up_form(email, "secret1", "Ada Lovelace", " Ada L ")
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn validation_failures_never_reach_the_provider() {
        let db = DatabaseService::open_in_memory().await.unwrap();
        let provider = FailingProvider::default();

        let mut screen = AuthScreen::new(AuthMode::Login);
        screen.email = "a@example.com".to_string();
        assert!(screen.submit(&provider, &db).await.is_none());
        assert_eq!(screen.error(), Some(FILL_ALL_FIELDS));

        screen.password = "12345".to_string();
        assert!(screen.submit(&provider, &db).await.is_none());
        assert_eq!(screen.error(), Some("Password must be at least 6 characters"));

        let mut sign_up = ada_sign_up("a@example.com");
        sign_up.username = "   ".to_string();
        assert!(sign_up.submit(&provider, &db).await.is_none());
        assert_eq!(sign_up.error(), Some(FILL_ALL_FIELDS));

        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn provider_errors_are_shown_verbatim_and_fields_kept() {
        let db = DatabaseService::open_in_memory().await.unwrap();
        let provider = FailingProvider::default();

        let mut screen = AuthScreen::new(AuthMode::Login);
        screen.email = "a@example.com".to_string();
        screen.password = "secret1".to_string();
        assert!(screen.submit(&provider, &db).await.is_none());

        assert_eq!(screen.error(), Some("Invalid login credentials"));
        assert_eq!(screen.success(), None);
        assert_eq!(screen.email, "a@example.com");
        assert!(!screen.is_loading());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sign_up_creates_profile_with_normalized_username() {
        let db = DatabaseService::open_in_memory().await.unwrap();
        let provider = LocalAuthProvider::new(db.clone());

        let mut screen = ada_sign_up("ada@example.com");
        let user = screen.submit(&provider, &db).await.unwrap();

        assert_eq!(screen.success(), Some("Account created! Welcome!"));
        assert!(user.session.is_some());
        let profile = db.get_user(&user.user_id).await.unwrap().unwrap();
        assert_eq!(profile.username, "adal");
        assert_eq!(profile.full_name, "Ada Lovelace");
        assert_eq!(profile.email, "ada@example.com");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn login_after_sign_up_stamps_last_login() {
        let db = DatabaseService::open_in_memory().await.unwrap();
        let provider = LocalAuthProvider::new(db.clone());
        let created = ada_sign_up("ada@example.com")
            .submit(&provider, &db)
            .await
            .unwrap();

        let mut screen =
            AuthScreen::with_credentials(AuthMode::Login, "ada@example.com", "secret1");
        let user = screen.submit(&provider, &db).await.unwrap();

        assert_eq!(user.user_id, created.user_id);
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(screen.success(), Some("Login successful!"));
        let profile = db.get_user(&user.user_id).await.unwrap().unwrap();
        assert!(profile.last_login.is_some());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn taken_username_leaves_no_account_behind() {
        let db = DatabaseService::open_in_memory().await.unwrap();
        let provider = LocalAuthProvider::new(db.clone());
        ada_sign_up("ada@example.com")
            .submit(&provider, &db)
            .await
            .unwrap();

        let mut clash = ada_sign_up("other@example.com");
        assert!(clash.submit(&provider, &db).await.is_none());
        assert_eq!(clash.error(), Some(USERNAME_TAKEN));
        assert!(db
            .find_identity_by_email("other@example.com")
            .await
            .unwrap()
            .is_none());

        let mut retry =
            AuthScreen::sign_up_form("other@example.com", "secret1", "Other", "other");
        let user = retry.submit(&provider, &db).await.unwrap();
        assert_eq!(retry.error(), None);
        assert!(db.get_user(&user.user_id).await.unwrap().is_some());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn confirmation_required_still_creates_profile() {
        let db = DatabaseService::open_in_memory().await.unwrap();

        let mut screen = ada_sign_up("new@example.com");
        let user = screen.submit(&ConfirmingProvider, &db).await.unwrap();

        assert!(user.session.is_none());
        assert_eq!(
            screen.success(),
            Some("Account created! Check your email to confirm your address.")
        );
        assert!(db.get_user(&user.user_id).await.unwrap().is_some());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn switching_mode_clears_banners_but_keeps_fields() {
        let db = DatabaseService::open_in_memory().await.unwrap();
        let mut screen = AuthScreen::new(AuthMode::Login);
        screen.email = "a@example.com".to_string();
        screen.submit(&FailingProvider::default(), &db).await;
        assert!(screen.error().is_some());

        screen.switch_mode(AuthMode::SignUp);
        assert_eq!(screen.error(), None);
        assert_eq!(screen.success(), None);
        assert_eq!(screen.email, "a@example.com");
        assert_eq!(screen.mode, AuthMode::SignUp);
    }
}
