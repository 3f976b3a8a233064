// ── Task abstraction ──
//
// A task is one unit of work against the session: a resource mutation,
// a config refresh, a save. The runner executes tasks and reports every
// outcome as a `TaskEvent` keyed by the task's `TaskId`.

mod refresh;
mod resource;

use std::fmt;
use std::future::Future;

use gostly_api::ResourceKind;

pub use refresh::{RefreshConfig, SaveConfig};
pub use resource::{Action, ResourceOp};

use crate::error::CoreError;
use crate::session::Session;

/// Stable identifier reported with every task outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskId {
    GetConfig,
    SaveConfig,
    Resource { kind: ResourceKind, action: Action },
    /// Caller-defined tasks.
    Custom(&'static str),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GetConfig => f.write_str("get_config"),
            Self::SaveConfig => f.write_str("save_config"),
            Self::Resource { kind, action } => write!(f, "{action}_{kind}"),
            Self::Custom(name) => f.write_str(name),
        }
    }
}

/// A unit of work executed by the [`Runner`](crate::Runner).
///
/// Tasks are immutable once built and may be run repeatedly; each run
/// resolves the session's current client afresh.
pub trait Task: Send + Sync {
    fn id(&self) -> TaskId;

    fn run(&self, session: &Session) -> impl Future<Output = Result<(), CoreError>> + Send;
}
