//! `watch`: poll the server and re-render on every snapshot.

use std::io::IsTerminal;
use std::time::Duration;

use owo_colors::OwoColorize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use gostly_core::{Runner, ServerConfig, TaskId};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::{show, util};

pub async fn handle(
    runner: &Runner,
    server: &ServerConfig,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut server = server.clone();
    if let Some(secs) = args.interval {
        server.interval = Duration::from_secs(secs);
    }
    if server.interval.is_zero() {
        return Err(CliError::Validation {
            field: "interval".into(),
            reason: "watch needs a positive refresh interval".into(),
        });
    }

    let mut events = runner.subscribe();
    runner.switch_server(&server).await?;
    let cancel = util::interrupt_token();
    let redraw = matches!(global.output, OutputFormat::Table) && std::io::stdout().is_terminal();
    let mut shown = 0usize;

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            ev = events.recv() => match ev {
                Ok(ev) if ev.task == TaskId::GetConfig => {
                    if let Some(e) = ev.error {
                        warn!(server = %server.name, error = %e, "refresh failed");
                        continue;
                    }
                    shown += 1;
                    render(runner, &server, shown, redraw, global)?;
                    if args.count.is_some_and(|n| shown >= n) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "watch fell behind"),
                Err(RecvError::Closed) => break,
            }
        }
    }

    runner.stop_polling().await;
    Ok(())
}

fn render(
    runner: &Runner,
    server: &ServerConfig,
    seq: usize,
    redraw: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let cfg = runner.session().config();
    let body = show::render_snapshot(&global.output, &cfg)?;
    if global.quiet {
        return Ok(());
    }

    if redraw {
        // clear screen, cursor home
        print!("\x1b[2J\x1b[H");
    }
    if matches!(global.output, OutputFormat::Table) {
        let header = format!("{} ({}) #{seq}", server.name, server.url);
        if output::should_color(&global.color) {
            println!("{}", header.bold());
        } else {
            println!("{header}");
        }
    }
    output::print_output(&body, false);
    Ok(())
}
