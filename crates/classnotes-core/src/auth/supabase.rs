//! Supabase GoTrue client

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;

use super::{
    normalize_auth_url, validate_credentials, AuthError, AuthProvider, AuthResult, AuthSession,
    AuthUser, SessionPersistence, SignUpOutcome,
};
use crate::models::UserId;
use crate::util::unix_timestamp_now;

#[derive(Clone)]
pub struct SupabaseAuthClient<S: SessionPersistence> {
    auth_url: String,
    anon_key: String,
    client: Client,
    store: S,
}

impl<S: SessionPersistence> SupabaseAuthClient<S> {
    pub fn new(url: impl AsRef<str>, anon_key: impl Into<String>, store: S) -> AuthResult<Self> {
        let auth_url = normalize_auth_url(url.as_ref())?;
        let anon_key = anon_key.into().trim().to_string();
        if anon_key.is_empty() {
            return Err(AuthError::InvalidConfiguration(
                "Supabase anon key must not be empty",
            ));
        }

        Ok(Self {
            auth_url,
            anon_key,
            client: Client::builder().build()?,
            store,
        })
    }

    pub fn auth_url(&self) -> &str {
        &self.auth_url
    }

    /// Load the persisted session, refreshing it when expired.
    ///
    /// A session that cannot be refreshed is cleared and `None` returned.
    pub async fn restore_session(&self) -> AuthResult<Option<AuthSession>> {
        let Some(stored_session) = self.store.load_session()? else {
            return Ok(None);
        };

        if !stored_session.is_expired() {
            return Ok(Some(stored_session));
        }

        match self.refresh_session(&stored_session.refresh_token).await {
            Ok(refreshed) => Ok(Some(refreshed)),
            Err(error) => {
                tracing::warn!("Failed to refresh persisted session: {}", error);
                self.store.clear_session()?;
                Ok(None)
            }
        }
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> AuthResult<AuthSession> {
        if refresh_token.trim().is_empty() {
            return Err(AuthError::InvalidConfiguration(
                "Refresh token must not be empty",
            ));
        }

        self.token_grant(
            "refresh_token",
            &serde_json::json!({ "refresh_token": refresh_token }),
            "Refresh",
        )
        .await
    }

    /// POST `/token?grant_type=...` and persist the returned session.
    async fn token_grant(
        &self,
        grant_type: &str,
        payload: &serde_json::Value,
        action: &str,
    ) -> AuthResult<AuthSession> {
        let request = self
            .client
            .post(format!("{}/token", self.auth_url))
            .query(&[("grant_type", grant_type)])
            .json(payload);
        let session = self
            .send(self.with_anon_key(request))
            .await?
            .into_session()?
            .ok_or_else(|| {
                AuthError::Api(format!("{action} response did not include an active session"))
            })?;

        self.store.save_session(&session)?;
        Ok(session)
    }

    fn with_anon_key(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    async fn send(&self, request: RequestBuilder) -> AuthResult<SupabaseAuthResponse> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<SupabaseAuthResponse>().await?);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AuthError::Api(parse_api_error(status, &body)))
    }
}

impl<S: SessionPersistence> AuthProvider for SupabaseAuthClient<S> {
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        validate_credentials(email, password)?;
        self.token_grant(
            "password",
            &serde_json::json!({ "email": email.trim(), "password": password }),
            "Sign-in",
        )
        .await
    }

    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome> {
        validate_credentials(email, password)?;

        let request = self
            .client
            .post(format!("{}/signup", self.auth_url))
            .json(&serde_json::json!({ "email": email.trim(), "password": password }));
        let response = self.send(self.with_anon_key(request)).await?;
        let user = response.user_hint();

        if let Some(session) = response.into_session()? {
            self.store.save_session(&session)?;
            return Ok(SignUpOutcome::SignedIn(session));
        }
        user.map(SignUpOutcome::ConfirmationRequired)
            .ok_or_else(|| AuthError::Api("Sign-up response did not include a user".to_string()))
    }

    /// Revoke the session server-side. An already invalid token counts as
    /// signed out.
    async fn sign_out(&self, session: &AuthSession) -> AuthResult<()> {
        let response = self
            .client
            .post(format!("{}/logout", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() && status != StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Api(parse_api_error(status, &body)));
        }

        self.store.clear_session()?;
        Ok(())
    }
}

/// Token fields as GoTrue returns them, either top-level or under `session`
#[derive(Debug, Default, Deserialize)]
struct SessionFields {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
    expires_in: Option<i64>,
    user: Option<SupabaseUser>,
}

impl SessionFields {
    fn or(self, fallback: Self) -> Self {
        Self {
            access_token: self.access_token.or(fallback.access_token),
            refresh_token: self.refresh_token.or(fallback.refresh_token),
            expires_at: self.expires_at.or(fallback.expires_at),
            expires_in: self.expires_in.or(fallback.expires_in),
            user: self.user.or(fallback.user),
        }
    }

    /// Absolute expiry in Unix seconds; `expires_in` counts from `now`.
    fn expiry(&self, now: i64) -> Option<i64> {
        self.expires_at
            .or_else(|| self.expires_in.map(|seconds| now.saturating_add(seconds)))
    }
}

#[derive(Debug, Deserialize)]
struct SupabaseAuthResponse {
    #[serde(flatten)]
    fields: SessionFields,
    session: Option<SessionFields>,
    /// Sign-up without auto-confirm returns the bare user object
    id: Option<UserId>,
    email: Option<String>,
}

impl SupabaseAuthResponse {
    fn user_hint(&self) -> Option<AuthUser> {
        match (&self.fields.user, self.id) {
            (Some(user), _) => Some(user.clone().into()),
            (None, Some(id)) => Some(AuthUser {
                id,
                email: self.email.clone(),
            }),
            (None, None) => None,
        }
    }

    /// `Ok(None)` when the response carries no token fields at all.
    fn into_session(self) -> AuthResult<Option<AuthSession>> {
        let fields = match self.session {
            Some(nested) => self.fields.or(nested),
            None => self.fields,
        };
        let expires_at = fields.expiry(unix_timestamp_now());

        match (fields.access_token, fields.refresh_token, expires_at, fields.user) {
            (Some(access_token), Some(refresh_token), Some(expires_at), Some(user)) => {
                Ok(Some(AuthSession {
                    access_token,
                    refresh_token,
                    expires_at,
                    user: user.into(),
                }))
            }
            (None, None, None, _) => Ok(None),
            _ => Err(AuthError::Api(
                "Auth response did not include enough session fields".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct SupabaseUser {
    id: UserId,
    email: Option<String>,
}

impl From<SupabaseUser> for AuthUser {
    fn from(value: SupabaseUser) -> Self {
        Self {
            id: value.id,
            email: value.email,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SupabaseErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
    message: Option<String>,
    msg: Option<String>,
}

impl SupabaseErrorResponse {
    fn best_message(self) -> Option<String> {
        [self.message, self.msg, self.error_description, self.error]
            .into_iter()
            .flatten()
            .map(|message| message.trim().to_string())
            .find(|message| !message.is_empty())
    }
}

/// Human readable provider error, suffixed with the HTTP status code.
fn parse_api_error(status: StatusCode, body: &str) -> String {
    let code = status.as_u16();
    let message = serde_json::from_str::<SupabaseErrorResponse>(body)
        .ok()
        .and_then(SupabaseErrorResponse::best_message)
        .or_else(|| Some(body.trim().to_string()).filter(|body| !body.is_empty()));

    match message {
        Some(message) => format!("{message} ({code})"),
        None => format!("HTTP {code}"),
    }
}
