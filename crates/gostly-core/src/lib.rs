//! Session state, task execution and stats tracking for gostly.
//!
//! A [`Session`] holds the current REST client and configuration
//! snapshot. [`Task`]s act on the session; the [`Runner`] executes them
//! once or periodically and broadcasts a [`TaskEvent`] per run.

pub mod config;
pub mod error;
pub mod runner;
pub mod session;
pub mod stats;
pub mod task;

pub use config::ServerConfig;
pub use error::CoreError;
pub use runner::{EVENT_CHANNEL_SIZE, Runner, TaskEvent};
pub use session::Session;
pub use task::{Action, RefreshConfig, ResourceOp, SaveConfig, Task, TaskId};

pub use gostly_api::Error as ApiError;
pub use gostly_api::{
    BasicAuth, Client, Config, ConfigFormat, Resource, ResourceKind, ServiceConfig, ServiceStats,
    ServiceStatus, TlsMode,
};
