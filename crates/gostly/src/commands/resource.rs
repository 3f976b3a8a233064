//! Resource create/update/delete handlers.

use std::path::Path;

use serde_json::Value;

use gostly_core::{ResourceKind, ResourceOp, Runner};

use crate::cli::GlobalOpts;
use crate::error::{CliError, resource_error};
use crate::output;

use super::util;

pub async fn create(
    runner: &Runner,
    kind: ResourceKind,
    file: &Path,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let payload = util::read_json_file(file)?;
    let name = payload_name(&payload)?;

    let op = ResourceOp::create(kind, name.clone(), Some(payload));
    run(runner, &op, kind, &name).await?;

    output::print_done(&format!("created {kind} '{name}'"), global.quiet, &global.color);
    Ok(())
}

pub async fn update(
    runner: &Runner,
    kind: ResourceKind,
    name: &str,
    file: &Path,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let payload = util::read_json_file(file)?;
    let new_name = payload_name(&payload)?;

    let op = ResourceOp::update(kind, name, Some(payload));
    run(runner, &op, kind, name).await?;

    let message = if new_name == name {
        format!("updated {kind} '{name}'")
    } else {
        format!("updated {kind} '{name}' (now '{new_name}')")
    };
    output::print_done(&message, global.quiet, &global.color);
    Ok(())
}

pub async fn delete(
    runner: &Runner,
    kind: ResourceKind,
    name: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if !util::confirm(&format!("Delete {kind} '{name}'?"), "delete", global.yes)? {
        return Ok(());
    }

    run(runner, &ResourceOp::delete(kind, name), kind, name).await?;

    output::print_done(&format!("deleted {kind} '{name}'"), global.quiet, &global.color);
    Ok(())
}

async fn run<P>(
    runner: &Runner,
    op: &ResourceOp<P>,
    kind: ResourceKind,
    name: &str,
) -> Result<(), CliError>
where
    P: serde::Serialize + Send + Sync,
{
    runner
        .exec(op, &util::interrupt_token())
        .await
        .map_err(|e| resource_error(e, kind, name))
}

/// The resource's `name` field; GOST requires one on every object.
fn payload_name(payload: &Value) -> Result<String, CliError> {
    match payload.get("name").and_then(Value::as_str) {
        Some(name) if !name.is_empty() => Ok(name.to_owned()),
        _ => Err(CliError::Validation {
            field: "name".into(),
            reason: "the JSON document needs a non-empty \"name\" field".into(),
        }),
    }
}
