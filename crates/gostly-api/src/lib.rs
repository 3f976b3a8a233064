// gostly-api: Async Rust client for the GOST proxy configuration API

pub mod client;
pub mod error;
pub mod model;
pub mod options;
pub mod resource;

pub use client::Client;
pub use error::Error;
pub use model::{Config, Resource, ServiceConfig, ServiceStats, ServiceStatus};
pub use options::{BasicAuth, ClientOptions, TlsMode};
pub use resource::{ConfigFormat, ResourceKind};
