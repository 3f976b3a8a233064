//! `save`: persist the server's running configuration.

use gostly_core::{ConfigFormat, Runner, SaveConfig};

use crate::cli::{GlobalOpts, SaveFormat};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    runner: &Runner,
    format: SaveFormat,
    path: Option<String>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let format = match format {
        SaveFormat::Yaml => ConfigFormat::Yaml,
        SaveFormat::Json => ConfigFormat::Json,
    };
    let task = SaveConfig::new(format, path);
    runner.exec(&task, &util::interrupt_token()).await?;

    let target = task.path.as_deref().unwrap_or("server default path");
    output::print_done(
        &format!("saved configuration as {format} to {target}"),
        global.quiet,
        &global.color,
    );
    Ok(())
}
