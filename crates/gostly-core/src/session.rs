// ── Session state ──
//
// The current REST client and the current configuration snapshot.
// Both are swapped wholesale; readers get a consistent `Arc` and never
// hold a lock across an await.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::watch;

use gostly_api::{Client, Config};

/// Shared state for one operator session.
///
/// Cheaply cloneable via `Arc<SessionInner>`. Tasks resolve the client
/// through [`client()`](Self::client) at execution time, so swapping it
/// redirects every subsequent run without touching in-flight ones.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    client: ArcSwap<Client>,
    config: watch::Sender<Arc<Config>>,
}

impl Session {
    pub fn new(client: Client) -> Self {
        let (config, _) = watch::channel(Arc::new(Config::default()));
        Self {
            inner: Arc::new(SessionInner {
                client: ArcSwap::from_pointee(client),
                config,
            }),
        }
    }

    // ── Client slot ──────────────────────────────────────────────────

    /// The client tasks should use right now.
    pub fn client(&self) -> Arc<Client> {
        self.inner.client.load_full()
    }

    pub fn set_client(&self, client: Client) {
        self.inner.client.store(Arc::new(client));
    }

    // ── Snapshot slot ────────────────────────────────────────────────

    /// The current configuration snapshot (cheap `Arc` clone).
    pub fn config(&self) -> Arc<Config> {
        self.inner.config.borrow().clone()
    }

    /// Replace the snapshot and notify subscribers.
    pub fn install_config(&self, config: Config) {
        self.inner.config.send_replace(Arc::new(config));
    }

    /// Reset to an empty snapshot (e.g. after switching servers).
    pub fn clear_config(&self) {
        self.install_config(Config::default());
    }

    /// Subscribe to snapshot replacements.
    pub fn subscribe_config(&self) -> watch::Receiver<Arc<Config>> {
        self.inner.config.subscribe()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Client::noop())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.client().base_url())
            .field("services", &self.config().services.len())
            .finish()
    }
}
