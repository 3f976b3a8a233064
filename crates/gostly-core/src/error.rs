// ── Core error types ──
//
// Cloneable so a single failure can be both returned to the caller and
// broadcast to event subscribers. API errors pass through unchanged.

use std::sync::Arc;

use thiserror::Error;

use gostly_api::ResourceKind;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// Transport, protocol or decode failure from the REST client.
    #[error(transparent)]
    Api(Arc<gostly_api::Error>),

    #[error("failed to encode {kind} payload: {source}")]
    Serialization {
        kind: ResourceKind,
        source: Arc<serde_json::Error>,
    },

    #[error("task cancelled")]
    Cancelled,
}

impl From<gostly_api::Error> for CoreError {
    fn from(err: gostly_api::Error) -> Self {
        Self::Api(Arc::new(err))
    }
}

impl CoreError {
    /// The underlying client error, if any.
    pub fn api_error(&self) -> Option<&gostly_api::Error> {
        match self {
            Self::Api(e) => Some(e.as_ref()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.api_error().is_some_and(gostly_api::Error::is_not_found)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
