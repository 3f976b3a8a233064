mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gostly_config::LogSettings;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log = config::load_settings(&cli.global)
        .map(|s| s.log)
        .unwrap_or_default();
    init_tracing(cli.global.verbose, &log);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// `RUST_LOG` wins, then `-v` count, then the settings file's `log.level`.
fn init_tracing(verbosity: u8, log: &LogSettings) {
    let level = match verbosity {
        0 => log.level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if log.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Profile management never touches the network
        Command::Server(args) => commands::server::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "gostly", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let settings = config::load_settings(&cli.global)?;
            let server = config::resolve_server(&cli.global, &settings)?;

            tracing::debug!(command = ?cmd, server = %server.name, "dispatching command");
            commands::dispatch(cmd, &server, &cli.global).await
        }
    }
}
