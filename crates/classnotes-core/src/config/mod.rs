//! Client configuration.
//!
//! `ClientConfig` says where the record store lives and which auth provider to
//! use. Front ends fill it from their own settings file and then let
//! environment variables override individual values.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::auth::{resolve_optional_supabase_config, AuthResult};
use crate::util::normalize_text_option;

pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
pub const ENV_SUPABASE_ANON_KEY: &str = "SUPABASE_ANON_KEY";
pub const ENV_DB_PATH: &str = "CLASSNOTES_DB_PATH";

const DEFAULT_DB_FILE: &str = "classnotes.db";

/// Public client settings. Secret credentials must never be stored here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(default)]
    pub supabase_url: Option<String>,
    #[serde(default)]
    pub supabase_anon_key: Option<String>,
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

impl ClientConfig {
    /// Values from the process environment only
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            supabase_url: normalize_text_option(lookup(ENV_SUPABASE_URL)),
            supabase_anon_key: normalize_text_option(lookup(ENV_SUPABASE_ANON_KEY)),
            db_path: normalize_text_option(lookup(ENV_DB_PATH)).map(PathBuf::from),
        }
    }

    /// Take every value set in `overrides`, keep ours for the rest.
    #[must_use]
    pub fn overlay(self, overrides: Self) -> Self {
        Self {
            supabase_url: normalize_text_option(overrides.supabase_url)
                .or_else(|| normalize_text_option(self.supabase_url)),
            supabase_anon_key: normalize_text_option(overrides.supabase_anon_key)
                .or_else(|| normalize_text_option(self.supabase_anon_key)),
            db_path: overrides.db_path.or(self.db_path),
        }
    }

    /// Supabase URL and anon key when the hosted provider is configured.
    pub fn supabase(&self) -> AuthResult<Option<(String, String)>> {
        resolve_optional_supabase_config(self.supabase_url.clone(), self.supabase_anon_key.clone())
    }

    /// Database path, falling back to `classnotes.db` in `data_dir`.
    pub fn resolve_db_path(&self, data_dir: impl Into<PathBuf>) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| data_dir.into().join(DEFAULT_DB_FILE))
    }
}
