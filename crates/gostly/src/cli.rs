//! Clap derive structures for the `gostly` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use gostly_core::ResourceKind;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// gostly -- manage GOST proxies through their configuration API
#[derive(Debug, Parser)]
#[command(
    name = "gostly",
    version,
    about = "Manage GOST proxy services from the command line",
    long_about = "Inspect and edit a running GOST instance through its REST \
        configuration API: list services with live throughput, create, update \
        and delete resources, and persist the running configuration.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, short = 's', env = "GOSTLY_SERVER", global = true)]
    pub server: Option<String>,

    /// API URL (overrides profile)
    #[arg(long, short = 'u', env = "GOSTLY_URL", global = true)]
    pub url: Option<String>,

    /// Basic auth username (password from GOSTLY_PASSWORD or keyring)
    #[arg(long, env = "GOSTLY_USER", global = true)]
    pub user: Option<String>,

    /// Settings file (default: platform config dir)
    #[arg(long, env = "GOSTLY_CONFIG", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "GOSTLY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "GOSTLY_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "GOSTLY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one name per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SaveFormat {
    Yaml,
    Json,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the configuration once and print it
    #[command(alias = "ls")]
    Show(ShowArgs),

    /// Poll the configuration and print service throughput
    Watch(WatchArgs),

    /// Create a resource from a JSON file
    Create {
        /// Resource kind (service, chain, hop, auther, ...)
        kind: ResourceKind,

        /// JSON document describing the resource
        #[arg(long, short = 'f', value_name = "FILE")]
        file: PathBuf,
    },

    /// Replace a resource with the contents of a JSON file
    Update {
        kind: ResourceKind,

        /// Current name of the resource
        name: String,

        #[arg(long, short = 'f', value_name = "FILE")]
        file: PathBuf,
    },

    /// Delete a resource
    #[command(alias = "rm")]
    Delete { kind: ResourceKind, name: String },

    /// Ask the server to persist its running configuration
    Save {
        #[arg(long, default_value = "yaml")]
        format: SaveFormat,

        /// Destination path on the server
        #[arg(long)]
        path: Option<String>,
    },

    /// Manage saved server profiles
    Server(ServerArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Only list names of this resource kind
    pub kind: Option<ResourceKind>,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Refresh period in seconds (overrides profile)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,

    /// Exit after this many snapshots
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SERVER PROFILES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ServerArgs {
    #[command(subcommand)]
    pub command: ServerCommand,
}

#[derive(Debug, Subcommand)]
pub enum ServerCommand {
    /// List saved profiles
    #[command(alias = "ls")]
    List,

    /// Add a profile
    ///
    /// `--timeout` and `--insecure` are stored with the profile.
    Add {
        name: String,

        /// API address, e.g. 127.0.0.1:18080
        #[arg(value_name = "URL")]
        address: String,

        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        password: Option<String>,

        /// Store the password in the system keyring instead of the file
        #[arg(long, requires = "password")]
        keyring: bool,

        /// Refresh period in seconds
        #[arg(long, default_value = "3")]
        interval: u64,
    },

    /// Remove a profile
    #[command(alias = "rm")]
    Remove { name: String },

    /// Select the profile used by default
    Use { name: String },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
