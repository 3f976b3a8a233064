//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one name per line.

use std::io::{self, IsTerminal, Write};

use bytesize::ByteSize;
use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use gostly_core::ServiceConfig;

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of items in the chosen format.
///
/// `table` builds rows with `to_row`; `plain` emits `id_fn` per item.
pub fn render_list<'a, T, R>(
    format: &OutputFormat,
    data: &'a [T],
    to_row: impl Fn(&'a T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
        structured => render_structured(structured, data),
    }
}

/// Render one item; `table` uses `detail_fn`.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> Result<String, CliError>,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Plain => Ok(id_fn(data)),
        structured => render_structured(structured, data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// One-line confirmation on stderr, e.g. "created service 'web'".
pub fn print_done(message: &str, quiet: bool, color: &ColorMode) {
    if quiet {
        return;
    }
    if should_color(color) {
        eprintln!("{} {message}", "✓".green().bold());
    } else {
        eprintln!("{message}");
    }
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_structured<T: serde::Serialize + ?Sized>(
    format: &OutputFormat,
    data: &T,
) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        _ => serde_json::to_string_pretty(data)?,
    })
}

// ── Service table ────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct ServiceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Addr")]
    addr: String,
    #[tabled(rename = "Handler")]
    handler: String,
    #[tabled(rename = "Listener")]
    listener: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Conns")]
    conns: String,
    #[tabled(rename = "Errors")]
    errors: String,
    #[tabled(rename = "Req/s")]
    request_rate: String,
    #[tabled(rename = "In")]
    input: String,
    #[tabled(rename = "Out")]
    output: String,
}

impl From<&ServiceConfig> for ServiceRow {
    fn from(s: &ServiceConfig) -> Self {
        let stats = s.stats();
        Self {
            name: s.name.clone(),
            addr: s.addr.clone(),
            handler: s.handler.as_ref().map(|h| h.kind.clone()).unwrap_or_default(),
            listener: s
                .listener
                .as_ref()
                .map(|l| l.kind.clone())
                .unwrap_or_default(),
            state: s.status.as_ref().map(|st| st.state.clone()).unwrap_or_default(),
            conns: stats
                .map(|st| format!("{}/{}", st.current_conns, st.total_conns))
                .unwrap_or_default(),
            errors: stats.map(|st| st.total_errs.to_string()).unwrap_or_default(),
            request_rate: stats
                .map(|st| format!("{:.1}", st.request_rate))
                .unwrap_or_default(),
            input: stats
                .map(|st| traffic(st.input_bytes, st.input_rate_bytes))
                .unwrap_or_default(),
            output: stats
                .map(|st| traffic(st.output_bytes, st.output_rate_bytes))
                .unwrap_or_default(),
        }
    }
}

/// "12.3 MB (4.0 KB/s)"
fn traffic(total: u64, rate: f64) -> String {
    format!("{} ({}/s)", ByteSize::b(total), ByteSize::b(whole_bytes(rate)))
}

#[allow(
    clippy::as_conversions,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn whole_bytes(rate: f64) -> u64 {
    if rate.is_finite() && rate > 0.0 {
        rate.round() as u64
    } else {
        0
    }
}
