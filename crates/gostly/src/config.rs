//! CLI configuration: thin wrapper around `gostly_config`.
//!
//! Adds `--config` path handling and resolution that respects
//! `GlobalOpts` flag overrides (--server, --url, --user, ...).

use std::path::PathBuf;

use gostly_config::{ServerProfile, Settings};
use gostly_core::ServerConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// The settings file in effect: `--config` or the platform default.
pub fn settings_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(gostly_config::settings_path)
}

pub fn load_settings(global: &GlobalOpts) -> Result<Settings, CliError> {
    Ok(gostly_config::load_settings_from(&settings_path(global))?)
}

pub fn save_settings(global: &GlobalOpts, settings: &Settings) -> Result<(), CliError> {
    Ok(gostly_config::save_settings_to(
        &settings_path(global),
        settings,
    )?)
}

/// Pick the profile named by `--server`, else the selected one, then
/// apply flag overrides. Flags alone (`--url`) are enough without any
/// saved profile.
pub fn resolve_profile(global: &GlobalOpts, settings: &Settings) -> Result<ServerProfile, CliError> {
    let mut profile = match &global.server {
        Some(name) => settings
            .server(name)
            .cloned()
            .ok_or_else(|| CliError::ProfileNotFound {
                name: name.clone(),
                available: available(settings),
            })?,
        None => settings
            .current_server()
            .cloned()
            .unwrap_or_else(|| ServerProfile::new("cli", "")),
    };

    if let Some(url) = &global.url {
        profile.url.clone_from(url);
    }
    if let Some(user) = &global.user {
        profile.username = Some(user.clone());
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = timeout;
    }
    if global.insecure {
        profile.insecure = true;
    }

    if profile.url.trim().is_empty() {
        return Err(CliError::NoServer {
            path: settings_path(global).display().to_string(),
        });
    }
    Ok(profile)
}

pub fn resolve_server(global: &GlobalOpts, settings: &Settings) -> Result<ServerConfig, CliError> {
    Ok(resolve_profile(global, settings)?.to_server_config()?)
}

fn available(settings: &Settings) -> String {
    if settings.servers.is_empty() {
        return "(none)".into();
    }
    settings
        .servers
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
