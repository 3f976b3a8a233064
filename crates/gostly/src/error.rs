//! CLI error types with miette diagnostics.
//!
//! Maps core and settings errors into user-facing errors with help text
//! and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use gostly_config::ConfigError;
use gostly_core::{ApiError, CoreError};

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const CANCELLED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the GOST API")]
    #[diagnostic(
        code(gostly::connection_failed),
        help(
            "Check that GOST runs with its API enabled (e.g. `-api :18080`)\n\
             and that the server URL is correct: gostly server list"
        )
    )]
    ConnectionFailed {
        #[source]
        source: CoreError,
    },

    #[error("Authentication failed")]
    #[diagnostic(
        code(gostly::auth_failed),
        help("Pass --user and set GOSTLY_PASSWORD, or store credentials with: gostly server add")
    )]
    AuthFailed {
        #[source]
        source: CoreError,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("{kind} '{name}' not found")]
    #[diagnostic(code(gostly::not_found), help("Run: gostly show {kind}"))]
    NotFound { kind: String, name: String },

    #[error(transparent)]
    #[diagnostic(code(gostly::api_error))]
    Api(CoreError),

    // ── Configuration ────────────────────────────────────────────────

    #[error("No server configured")]
    #[diagnostic(
        code(gostly::no_server),
        help(
            "Pass --url, or add a profile with: gostly server add <name> <url>\n\
             Settings file: {path}"
        )
    )]
    NoServer { path: String },

    #[error("Server profile '{name}' not found")]
    #[diagnostic(code(gostly::profile_not_found), help("Available profiles: {available}"))]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(gostly::settings))]
    Settings(#[from] ConfigError),

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(gostly::validation))]
    Validation { field: String, reason: String },

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(gostly::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("Interrupted")]
    #[diagnostic(code(gostly::cancelled))]
    Cancelled,

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(gostly::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("YAML encoding failed: {0}")]
    #[diagnostic(code(gostly::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::NoServer { .. }
            | Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::Cancelled => exit_code::CANCELLED,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        if err.is_cancelled() {
            return Self::Cancelled;
        }
        let unreachable = matches!(
            err.api_error(),
            Some(ApiError::Transport(_) | ApiError::Tls(_))
        );
        let unauthorized = err.api_error().and_then(ApiError::status) == Some(401);

        if unauthorized {
            Self::AuthFailed { source: err }
        } else if unreachable {
            Self::ConnectionFailed { source: err }
        } else {
            Self::Api(err)
        }
    }
}

/// Map a failed resource operation, naming the target on 404.
pub fn resource_error(err: CoreError, kind: impl ToString, name: &str) -> CliError {
    if err.is_not_found() {
        CliError::NotFound {
            kind: kind.to_string(),
            name: name.into(),
        }
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use gostly_core::ResourceKind;

    use super::*;

    fn api(status: u16, code: i64, message: &str) -> CoreError {
        ApiError::Api {
            status,
            code,
            message: message.into(),
        }
        .into()
    }

    #[test]
    fn cancellation_maps_to_interrupt_code() {
        let err = CliError::from(CoreError::Cancelled);
        assert_eq!(err.exit_code(), exit_code::CANCELLED);
    }

    #[test]
    fn not_found_names_the_resource() {
        let err = resource_error(api(404, 40401, "not found"), ResourceKind::Chain, "c0");
        assert_eq!(err.to_string(), "chain 'c0' not found");
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
    }

    #[test]
    fn unauthorized_maps_to_auth_code() {
        let err = CliError::from(api(401, 401, "Unauthorized"));
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn other_api_errors_keep_server_message() {
        let err = CliError::from(api(400, 40001, "service web already exists"));
        assert_eq!(err.to_string(), "40001 service web already exists");
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }
}
