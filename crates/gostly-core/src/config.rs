// ── Runtime server configuration ──
//
// Describes *which* GOST API to talk to and how often to poll it.
// Carries credentials but never touches disk; `gostly-config` builds
// one from a persisted profile.

use std::time::Duration;

use gostly_api::{BasicAuth, Client, ClientOptions, TlsMode};

use crate::error::CoreError;

/// Connection settings for a single GOST API endpoint.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Display name of the profile this came from.
    pub name: String,
    /// API base URL. Empty means "not configured" (no-op client).
    pub url: String,
    pub auth: Option<BasicAuth>,
    pub tls: TlsMode,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Config refresh period. Zero disables periodic polling.
    pub interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "default".into(),
            url: String::new(),
            auth: None,
            tls: TlsMode::System,
            timeout: Duration::from_secs(10),
            interval: Duration::from_secs(3),
        }
    }
}

impl ServerConfig {
    pub fn client_options(&self) -> ClientOptions {
        let mut options = ClientOptions::default()
            .with_timeout(self.timeout)
            .with_tls(self.tls.clone());
        if let Some(auth) = &self.auth {
            options = options.with_basic_auth(auth.clone());
        }
        options
    }

    pub fn build_client(&self) -> Result<Client, CoreError> {
        Ok(Client::new(&self.url, &self.client_options())?)
    }
}
