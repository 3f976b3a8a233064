//! Persisted settings for gostly.
//!
//! YAML server profiles, credential resolution (env + keyring +
//! plaintext), and translation to `gostly_core::ServerConfig`. The CLI
//! layers its flag overrides on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use gostly_core::{BasicAuth, ServerConfig, TlsMode};

/// Keyring service name; entries are keyed by profile name.
const KEYRING_SERVICE: &str = "gostly";
const PASSWORD_ENV: &str = "GOSTLY_PASSWORD";
const SETTINGS_ENV: &str = "GOSTLY_CONFIG";
const SETTINGS_FILE: &str = "gost.yml";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no server profile named '{name}'")]
    UnknownServer { name: String },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize settings: {0}")]
    Serialization(#[from] serde_yaml::Error),

    #[error("settings loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Settings structs ────────────────────────────────────────────────

/// Top-level contents of `gost.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub servers: Vec<ServerProfile>,

    /// Index into `servers` of the selected profile.
    #[serde(default)]
    pub current: usize,

    #[serde(default = "default_lang")]
    pub lang: String,

    #[serde(default = "default_theme")]
    pub theme: String,

    #[serde(default)]
    pub log: LogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            servers: Vec::new(),
            current: 0,
            lang: default_lang(),
            theme: default_theme(),
            log: LogSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogSettings {
    /// `tracing` filter directive, e.g. "info" or "gostly_core=debug".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// "text" or "json".
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// A named GOST API endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerProfile {
    pub name: String,

    /// API address, e.g. "127.0.0.1:18080" or "https://gost.lan/api".
    #[serde(default)]
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Plaintext password. Prefer the keyring or `GOSTLY_PASSWORD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Refresh period in seconds. Zero disables polling.
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub insecure: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,
}

impl ServerProfile {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            username: None,
            password: None,
            interval: default_interval(),
            timeout: default_timeout(),
            insecure: false,
            ca_cert: None,
        }
    }
}

fn default_lang() -> String {
    "en".into()
}
fn default_theme() -> String {
    "system".into()
}
fn default_log_level() -> String {
    "warn".into()
}
fn default_log_format() -> String {
    "text".into()
}
fn default_interval() -> u64 {
    3
}
fn default_timeout() -> u64 {
    10
}

// ── Profile management ──────────────────────────────────────────────

impl Settings {
    /// The selected profile, if any.
    pub fn current_server(&self) -> Option<&ServerProfile> {
        self.servers.get(self.current)
    }

    pub fn server(&self, name: &str) -> Option<&ServerProfile> {
        self.servers.iter().find(|s| s.name == name)
    }

    /// Append a profile. The first profile added becomes the selection.
    pub fn add_server(&mut self, profile: ServerProfile) -> Result<(), ConfigError> {
        if profile.name.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "name".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.server(&profile.name).is_some() {
            return Err(ConfigError::Validation {
                field: "name".into(),
                reason: format!("profile '{}' already exists", profile.name),
            });
        }
        self.servers.push(profile);
        if self.servers.len() == 1 {
            self.current = 0;
        }
        Ok(())
    }

    /// Remove a profile, keeping the selection on the same profile where
    /// possible.
    pub fn remove_server(&mut self, name: &str) -> Result<ServerProfile, ConfigError> {
        let idx = self.index_of(name)?;
        let removed = self.servers.remove(idx);
        if idx < self.current {
            self.current -= 1;
        }
        if self.current >= self.servers.len() {
            self.current = self.servers.len().saturating_sub(1);
        }
        Ok(removed)
    }

    pub fn select(&mut self, name: &str) -> Result<(), ConfigError> {
        self.current = self.index_of(name)?;
        Ok(())
    }

    fn index_of(&self, name: &str) -> Result<usize, ConfigError> {
        self.servers
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| ConfigError::UnknownServer { name: name.into() })
    }
}

// ── Settings file path ──────────────────────────────────────────────

/// Resolve the settings file path: `$GOSTLY_CONFIG`, else the platform
/// config dir.
pub fn settings_path() -> PathBuf {
    if let Ok(path) = std::env::var(SETTINGS_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "gostly", "gostly").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push(SETTINGS_FILE);
            p
        },
        |dirs| dirs.config_dir().join(SETTINGS_FILE),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("gostly");
    p
}

// ── Loading and saving ──────────────────────────────────────────────

/// Defaults, overlaid by the YAML file at `path` (if present), overlaid
/// by `GOSTLY_*` variables (`GOSTLY_LOG_LEVEL` → `log.level`).
pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Settings::default()))
        .merge(Yaml::file(path))
        .merge(Env::prefixed("GOSTLY_").split("_"));

    let settings: Settings = figment.extract()?;
    Ok(settings)
}

/// Serialize to YAML and write to `path`, creating parent dirs.
pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let yaml = serde_yaml::to_string(settings)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve a profile's password: `GOSTLY_PASSWORD`, then the system
/// keyring, then the plaintext value in the file.
pub fn resolve_password(profile: &ServerProfile) -> Result<SecretString, ConfigError> {
    resolve_password_from(profile, std::env::var(PASSWORD_ENV).ok(), keyring_password)
}

fn resolve_password_from(
    profile: &ServerProfile,
    env: Option<String>,
    keyring: impl FnOnce(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    if let Some(pw) = env {
        return Ok(SecretString::from(pw));
    }
    if let Some(pw) = keyring(&profile.name) {
        return Ok(SecretString::from(pw));
    }
    if let Some(pw) = &profile.password {
        return Ok(SecretString::from(pw.clone()));
    }
    Err(ConfigError::NoCredentials {
        profile: profile.name.clone(),
    })
}

fn keyring_password(profile_name: &str) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, profile_name)
        .ok()?
        .get_password()
        .ok()
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &SecretString) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, profile_name)?.set_password(password.expose_secret())?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

impl ServerProfile {
    /// Build the runtime `ServerConfig`, resolving the password when a
    /// username is set.
    pub fn to_server_config(&self) -> Result<ServerConfig, ConfigError> {
        let auth = match self.username.as_deref().filter(|u| !u.is_empty()) {
            Some(username) => Some(BasicAuth {
                username: username.to_owned(),
                password: resolve_password(self)?,
            }),
            None => None,
        };
        self.server_config_with(auth)
    }

    fn server_config_with(&self, auth: Option<BasicAuth>) -> Result<ServerConfig, ConfigError> {
        if self.url.contains(char::is_whitespace) {
            return Err(ConfigError::Validation {
                field: "url".into(),
                reason: format!("invalid URL: {}", self.url),
            });
        }

        let tls = if self.insecure {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ca) = &self.ca_cert {
            TlsMode::CustomCa(ca.clone())
        } else {
            TlsMode::System
        };

        Ok(ServerConfig {
            name: self.name.clone(),
            url: self.url.clone(),
            auth,
            tls,
            timeout: Duration::from_secs(self.timeout),
            interval: Duration::from_secs(self.interval),
        })
    }
}
