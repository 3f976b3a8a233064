//! Command handlers.

pub mod resource;
pub mod save;
pub mod server;
pub mod show;
pub mod util;
pub mod watch;

use gostly_core::{Runner, ServerConfig, Session};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Run a command that talks to the API.
pub async fn dispatch(cmd: Command, server: &ServerConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let session = Session::new(server.build_client()?);
    let runner = Runner::new(session);

    match cmd {
        Command::Show(args) => show::handle(&runner, args, global).await,
        Command::Watch(args) => watch::handle(&runner, server, args, global).await,
        Command::Create { kind, file } => resource::create(&runner, kind, &file, global).await,
        Command::Update { kind, name, file } => {
            resource::update(&runner, kind, &name, &file, global).await
        }
        Command::Delete { kind, name } => resource::delete(&runner, kind, &name, global).await,
        Command::Save { format, path } => save::handle(&runner, format, path, global).await,
        Command::Server(_) | Command::Completions(_) => Ok(()),
    }
}
