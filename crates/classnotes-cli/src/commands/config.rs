use std::path::PathBuf;

use classnotes_core::auth::resolve_optional_supabase_config;
use classnotes_core::config::ClientConfig;
use classnotes_core::util::normalize_text_option;
use serde::Serialize;

use crate::cli::ConfigCommands;
use crate::config_profiles::{default_data_dir, CliProfilesConfig};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            supabase_url,
            supabase_anon_key,
            database,
            no_activate,
        } => run_config_init(
            global_profile,
            supabase_url,
            supabase_anon_key,
            database,
            no_activate,
        ),
        ConfigCommands::Show => run_config_show(global_profile),
    }
}

pub fn run_config_init(
    profile_name: Option<&str>,
    supabase_url: Option<String>,
    supabase_anon_key: Option<String>,
    database: Option<PathBuf>,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load()?;
    let profile_name = config.resolve_profile_name(profile_name);
    let existing = config.profile(&profile_name).cloned().unwrap_or_default();

    let merged_url = normalize_text_option(supabase_url).or(existing.supabase_url);
    let merged_anon_key = normalize_text_option(supabase_anon_key).or(existing.supabase_anon_key);
    resolve_optional_supabase_config(merged_url.clone(), merged_anon_key.clone())
        .map_err(|error| CliError::Config(error.to_string()))?;

    let profile = config.profile_mut_or_default(&profile_name);
    profile.supabase_url = merged_url;
    profile.supabase_anon_key = merged_anon_key;
    profile.db_path = database.or(existing.db_path);
    let uses_supabase = profile.supabase_url.is_some();

    if !no_activate || config.active_profile.is_none() {
        config.active_profile = Some(profile_name.clone());
    }
    let path = config.save()?;

    println!("Saved profile '{profile_name}' to {}", path.display());
    if uses_supabase {
        println!("Accounts: Supabase");
    } else {
        println!("Accounts: local (stored in the profile's database)");
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct EffectiveConfig {
    profile: String,
    active_profile: Option<String>,
    supabase_url: Option<String>,
    supabase_anon_key: Option<String>,
    db_path: PathBuf,
}

fn run_config_show(global_profile: Option<&str>) -> Result<(), CliError> {
    let profiles = CliProfilesConfig::load()?;
    let profile_name = profiles.resolve_profile_name(global_profile);
    let config = profiles
        .profile(&profile_name)
        .map(|profile| profile.client_config())
        .unwrap_or_default()
        .overlay(ClientConfig::from_env());

    let effective = EffectiveConfig {
        db_path: config.resolve_db_path(default_data_dir()?),
        profile: profile_name,
        active_profile: profiles.active_profile.clone(),
        supabase_url: config.supabase_url,
        supabase_anon_key: config.supabase_anon_key.as_deref().map(mask_key),
    };
    crate::commands::common::print_json(&effective)
}

/// Keep only the first and last four characters of a key.
pub fn mask_key(key: &str) -> String {
    let chars = key.chars().collect::<Vec<_>>();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head = chars[..4].iter().collect::<String>();
    let tail = chars[chars.len() - 4..].iter().collect::<String>();
    format!("{head}...{tail}")
}
