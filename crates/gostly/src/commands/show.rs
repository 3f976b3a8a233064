//! `show`: one refresh, then print.

use tabled::Tabled;

use gostly_core::{Config, RefreshConfig, Runner};

use crate::cli::{GlobalOpts, OutputFormat, ShowArgs};
use crate::error::CliError;
use crate::output::{self, ServiceRow};

use super::util;

#[derive(Tabled)]
struct NameRow {
    #[tabled(rename = "Name")]
    name: String,
}

pub async fn handle(runner: &Runner, args: ShowArgs, global: &GlobalOpts) -> Result<(), CliError> {
    runner
        .exec(&RefreshConfig, &util::interrupt_token())
        .await?;
    let cfg = runner.session().config();

    let out = match args.kind {
        Some(kind) => {
            let names = cfg.names(kind);
            output::render_list(
                &global.output,
                &names,
                |n| NameRow {
                    name: (*n).to_owned(),
                },
                |n| (*n).to_owned(),
            )?
        }
        None => render_snapshot(&global.output, &cfg)?,
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Services table for `table`, service names for `plain`, the whole
/// snapshot for structured formats.
pub fn render_snapshot(format: &OutputFormat, cfg: &Config) -> Result<String, CliError> {
    output::render_single(format, cfg, services_table, |c| {
        c.services
            .iter()
            .map(|s| s.name.clone())
            .collect::<Vec<_>>()
            .join("\n")
    })
}

fn services_table(cfg: &Config) -> Result<String, CliError> {
    if cfg.services.is_empty() {
        return Ok("No services.".into());
    }
    output::render_list(
        &OutputFormat::Table,
        &cfg.services,
        ServiceRow::from,
        |s| s.name.clone(),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use gostly_core::ServiceConfig;

    use super::*;

    fn snapshot(names: &[&str]) -> Config {
        Config {
            services: names
                .iter()
                .map(|n| ServiceConfig {
                    name: (*n).into(),
                    addr: ":8080".into(),
                    ..ServiceConfig::default()
                })
                .collect(),
            ..Config::default()
        }
    }

    #[test]
    fn table_lists_every_service() {
        let out = render_snapshot(&OutputFormat::Table, &snapshot(&["web", "socks"])).unwrap();
        assert!(out.contains("web"));
        assert!(out.contains("socks"));
        assert!(out.contains(":8080"));
    }

    #[test]
    fn empty_snapshot_says_so() {
        let out = render_snapshot(&OutputFormat::Table, &Config::default()).unwrap();
        assert_eq!(out, "No services.");
    }

    #[test]
    fn plain_is_one_name_per_line() {
        let out = render_snapshot(&OutputFormat::Plain, &snapshot(&["a", "b"])).unwrap();
        assert_eq!(out, "a\nb");
    }
}
