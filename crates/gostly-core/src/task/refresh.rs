// ── Snapshot tasks ──

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use gostly_api::ConfigFormat;

use super::{Task, TaskId};
use crate::error::CoreError;
use crate::session::Session;
use crate::stats;

/// Fetch the full configuration, derive rates against the previous
/// snapshot and install the result.
///
/// On failure the previous snapshot stays in place. A snapshot fetched
/// through a client that has since been swapped out is dropped rather
/// than installed over the new server's state.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshConfig;

impl Task for RefreshConfig {
    fn id(&self) -> TaskId {
        TaskId::GetConfig
    }

    async fn run(&self, session: &Session) -> Result<(), CoreError> {
        let client = session.client();

        let mut next = match client.get_config().await {
            Ok(cfg) => cfg,
            Err(e) => {
                debug!(task = %self.id(), error = %e, "refresh failed");
                return Err(e.into());
            }
        };

        stats::stamp(&mut next, Utc::now());
        stats::apply_rates(&session.config(), &mut next);

        if !Arc::ptr_eq(&client, &session.client()) {
            warn!("server changed during refresh; discarding snapshot");
            return Ok(());
        }

        debug!(services = next.services.len(), "snapshot refreshed");
        session.install_config(next);
        Ok(())
    }
}

/// Ask the server to persist its running configuration.
#[derive(Debug, Clone, Default)]
pub struct SaveConfig {
    pub format: ConfigFormat,
    /// Server-side destination; `None` uses the server's default.
    pub path: Option<String>,
}

impl SaveConfig {
    pub fn new(format: ConfigFormat, path: Option<String>) -> Self {
        Self { format, path }
    }
}

impl Task for SaveConfig {
    fn id(&self) -> TaskId {
        TaskId::SaveConfig
    }

    async fn run(&self, session: &Session) -> Result<(), CoreError> {
        session
            .client()
            .save_config(self.format, self.path.as_deref())
            .await
            .inspect_err(|e| debug!(task = %self.id(), error = %e, "save failed"))?;
        Ok(())
    }
}
