//! Shared helpers for command handlers.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use iotlab_api::{Api, FilePart};

use crate::error::CliError;

/// Experiment state the current experiment is looked up in.
const RUNNING: &str = "Running";

/// `id`, or the id of the user's single running experiment.
pub async fn resolve_experiment_id(api: &Api, id: Option<u32>) -> Result<u32, CliError> {
    if let Some(id) = id {
        return Ok(id);
    }

    let running = api.get_experiments(RUNNING, 0, 0).await?;
    let id = single_experiment_id(&running)?;
    debug!(id, "using current running experiment");
    Ok(id)
}

/// The only `items[].id` of an experiment listing.
pub fn single_experiment_id(listing: &Value) -> Result<u32, CliError> {
    let ids: Vec<u32> = listing
        .get("items")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|exp| exp.get("id").and_then(Value::as_u64))
        .filter_map(|id| u32::try_from(id).ok())
        .collect();

    match ids.as_slice() {
        [] => Err(CliError::NoRunningExperiment),
        [id] => Ok(*id),
        many => Err(CliError::AmbiguousExperiment {
            ids: many
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|_| CliError::NonInteractiveRequiresYes {
            action: message.into(),
        })
}

/// Read and parse a JSON file.
pub fn read_json_file(path: &Path, field: &str) -> Result<Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: field.into(),
        reason: format!("invalid JSON in {}: {e}", path.display()),
    })
}

/// Multipart part for a local firmware file, named by its base name.
pub fn firmware_part(path: &Path) -> Result<FilePart, CliError> {
    FilePart::from_path(path).map_err(|e| CliError::Validation {
        field: "firmware".into(),
        reason: format!("cannot read {}: {e}", path.display()),
    })
}
