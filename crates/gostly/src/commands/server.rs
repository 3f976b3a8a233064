//! `server` subcommand handlers: saved profile management.

use secrecy::SecretString;
use tabled::Tabled;

use gostly_config::ServerProfile;

use crate::cli::{GlobalOpts, ServerArgs, ServerCommand};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "")]
    current: &'static str,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Interval")]
    interval: String,
    #[tabled(rename = "Timeout")]
    timeout: String,
}

/// Copy of a profile safe to print.
fn redacted(profile: &ServerProfile) -> ServerProfile {
    let mut p = profile.clone();
    if p.password.is_some() {
        p.password = Some("****".into());
    }
    p
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ServerArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut settings = config::load_settings(global)?;

    match args.command {
        ServerCommand::List => {
            let current = settings.current_server().map(|s| s.name.clone());
            let profiles: Vec<ServerProfile> = settings.servers.iter().map(redacted).collect();
            let out = output::render_list(
                &global.output,
                &profiles,
                |p| ProfileRow {
                    current: if current.as_deref() == Some(p.name.as_str()) {
                        "*"
                    } else {
                        ""
                    },
                    name: p.name.clone(),
                    url: p.url.clone(),
                    user: p.username.clone().unwrap_or_default(),
                    interval: format!("{}s", p.interval),
                    timeout: format!("{}s", p.timeout),
                },
                |p| p.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ServerCommand::Add {
            name,
            address,
            username,
            password,
            keyring,
            interval,
        } => {
            let mut profile = ServerProfile::new(name.clone(), address);
            profile.username = username;
            profile.interval = interval;
            if let Some(timeout) = global.timeout {
                profile.timeout = timeout;
            }
            profile.insecure = global.insecure;

            match password {
                Some(pw) if keyring => {
                    gostly_config::store_password(&name, &SecretString::from(pw))?;
                }
                other => profile.password = other,
            }

            settings.add_server(profile)?;
            config::save_settings(global, &settings)?;
            output::print_done(&format!("added server '{name}'"), global.quiet, &global.color);
            Ok(())
        }

        ServerCommand::Remove { name } => {
            settings.remove_server(&name)?;
            config::save_settings(global, &settings)?;
            output::print_done(&format!("removed server '{name}'"), global.quiet, &global.color);
            Ok(())
        }

        ServerCommand::Use { name } => {
            settings.select(&name)?;
            config::save_settings(global, &settings)?;
            output::print_done(&format!("now using '{name}'"), global.quiet, &global.color);
            Ok(())
        }
    }
}
