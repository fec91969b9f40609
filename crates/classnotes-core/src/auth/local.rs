//! Auth provider backed by the record store.
//!
//! Credentials live in `auth_identities` as Argon2id hashes; sessions are
//! opaque random tokens in `auth_sessions`.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::Rng;

use super::{
    validate_credentials, AuthError, AuthProvider, AuthResult, AuthSession, AuthUser,
    SignUpOutcome, MIN_PASSWORD_LEN,
};
use crate::db::StoredIdentity;
use crate::models::UserId;
use crate::services::DatabaseService;
use crate::util::{now_millis, unix_timestamp_now};

const SESSION_LIFETIME_SECONDS: i64 = 3_600;
const TOKEN_BYTES: usize = 32;

const ALREADY_REGISTERED: &str = "User already registered";
const INVALID_CREDENTIALS: &str = "Invalid login credentials";

#[derive(Clone)]
pub struct LocalAuthProvider {
    db: DatabaseService,
}

impl LocalAuthProvider {
    pub const fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// User behind a still-valid access token
    pub async fn session_user(&self, access_token: &str) -> AuthResult<Option<AuthUser>> {
        let identity = self
            .db
            .find_auth_session(access_token, unix_timestamp_now())
            .await
            .map_err(store_error)?;
        Ok(identity.map(|identity| AuthUser {
            id: identity.id,
            email: Some(identity.email),
        }))
    }

    async fn issue_session(&self, identity: &StoredIdentity) -> AuthResult<AuthSession> {
        let access_token = random_token();
        let expires_at = unix_timestamp_now() + SESSION_LIFETIME_SECONDS;
        self.db
            .insert_auth_session(&access_token, &identity.id, expires_at)
            .await
            .map_err(store_error)?;

        Ok(AuthSession {
            access_token,
            refresh_token: random_token(),
            expires_at,
            user: AuthUser {
                id: identity.id,
                email: Some(identity.email.clone()),
            },
        })
    }
}

impl AuthProvider for LocalAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        validate_credentials(email, password)?;

        let identity = self
            .db
            .find_identity_by_email(email)
            .await
            .map_err(store_error)?
            .ok_or_else(|| AuthError::Api(INVALID_CREDENTIALS.to_string()))?;
        if !verify_password(password, &identity.password_hash)? {
            return Err(AuthError::Api(INVALID_CREDENTIALS.to_string()));
        }

        tracing::debug!("Local sign-in for {}", identity.id);
        self.issue_session(&identity).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome> {
        validate_credentials(email, password)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Api(format!(
                "Password should be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let email = email.trim();
        if self
            .db
            .find_identity_by_email(email)
            .await
            .map_err(store_error)?
            .is_some()
        {
            return Err(AuthError::Api(ALREADY_REGISTERED.to_string()));
        }

        let identity = StoredIdentity {
            id: UserId::new(),
            email: email.to_string(),
            password_hash: hash_password(password)?,
            created_at: now_millis(),
        };
        match self.db.insert_identity(&identity).await {
            Ok(()) => {}
            Err(error) if error.is_unique_violation() => {
                return Err(AuthError::Api(ALREADY_REGISTERED.to_string()));
            }
            Err(error) => return Err(store_error(error)),
        }

        tracing::info!("Registered local identity {}", identity.id);
        Ok(SignUpOutcome::SignedIn(self.issue_session(&identity).await?))
    }

    async fn sign_out(&self, session: &AuthSession) -> AuthResult<()> {
        self.db
            .delete_auth_session(&session.access_token)
            .await
            .map_err(store_error)?;
        Ok(())
    }
}

fn store_error(error: crate::Error) -> AuthError {
    match error {
        crate::Error::Auth(error) => error,
        other => AuthError::Storage(other.to_string()),
    }
}

fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|error| AuthError::Password(error.to_string()))
}

fn verify_password(password: &str, hash: &str) -> AuthResult<bool> {
    let parsed =
        PasswordHash::new(hash).map_err(|error| AuthError::Password(error.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn random_token() -> String {
    let mut rng = rand::thread_rng();
    (0..TOKEN_BYTES)
        .map(|_| format!("{:02x}", rng.gen::<u8>()))
        .collect()
}
