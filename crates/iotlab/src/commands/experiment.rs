//! Experiment command handlers.

use std::path::PathBuf;

use serde_json::Value;
use tracing::debug;

use iotlab_api::{Api, ExperimentDescription, FilePart, Payload};

use crate::cli::{ExperimentArgs, ExperimentCommand, GlobalOpts, OutputFormat, SubmitArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    api: &Api,
    args: ExperimentArgs,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    let value = match args.command {
        ExperimentCommand::Info { list_id, site } => {
            api.get_resources(list_id, site.as_deref()).await?
        }

        ExperimentCommand::List {
            state,
            limit,
            offset,
        } => api.get_experiments(&state, limit, offset).await?,

        ExperimentCommand::Submit(submit) => {
            let (description, firmwares) = build_submission(submit)?;
            api.submit_experiment(description_parts(description, firmwares)?)
                .await?
        }

        ExperimentCommand::Get {
            id,
            resources,
            resources_id,
            state,
            archive,
            ..
        } => {
            let id = util::resolve_experiment_id(api, id).await?;
            let option = info_option(resources, resources_id, state, archive);
            match api.get_experiment_info(id, option).await? {
                Payload::Binary(bytes) => {
                    let path = PathBuf::from(format!("{id}.tar.gz"));
                    std::fs::write(&path, &bytes)?;
                    output::print_status(&format!("Written {}", path.display()), global.quiet);
                    return Ok(());
                }
                Payload::Json(value) => value,
                Payload::Text(text) => Value::String(text),
            }
        }

        ExperimentCommand::Stop { id } => {
            let id = util::resolve_experiment_id(api, id).await?;
            if !util::confirm(&format!("Stop experiment {id}?"), global.yes)? {
                return Ok(());
            }
            api.stop_experiment(id).await?
        }
    };

    output::print_output(&output::render_value(format, &value)?, global.quiet);
    Ok(())
}

/// Option string of `get_experiment_info`; the submission when no flag is set.
#[allow(clippy::fn_params_excessive_bools)]
fn info_option(resources: bool, resources_id: bool, state: bool, archive: bool) -> &'static str {
    if resources {
        "resources"
    } else if resources_id {
        "id"
    } else if state {
        "state"
    } else if archive {
        "data"
    } else {
        ""
    }
}

/// Description document and firmware parts for `experiment submit`.
fn build_submission(args: SubmitArgs) -> Result<(Value, Vec<FilePart>), CliError> {
    let firmwares = args
        .firmware
        .as_deref()
        .map(util::firmware_part)
        .transpose()?
        .into_iter()
        .collect::<Vec<_>>();

    if let Some(ref path) = args.from_file {
        let description = util::read_json_file(path, "from-file")?;
        return Ok((description, firmwares));
    }

    let duration = args.duration.ok_or_else(|| CliError::Validation {
        field: "duration".into(),
        reason: "required".into(),
    })?;
    if args.nodes.is_empty() {
        return Err(CliError::Validation {
            field: "list".into(),
            reason: "at least one node is required".into(),
        });
    }

    let mut description = ExperimentDescription::physical(duration, args.nodes);
    if let Some(name) = args.name {
        description = description.with_name(name);
    }
    if let Some(ts) = args.reservation {
        description = description.with_reservation(ts);
    }
    if let Some(firmware) = firmwares.first() {
        description = description.with_firmware(firmware.name.clone(), Vec::new());
    }
    if let Some(profile) = args.profile {
        description = description.with_profile(profile, Vec::new());
    }

    debug!(?description, "built experiment description");
    Ok((serde_json::to_value(&description)?, firmwares))
}

/// `new_exp.json` first, then the firmware files.
fn description_parts(description: Value, firmwares: Vec<FilePart>) -> Result<Vec<FilePart>, CliError> {
    let mut parts = Vec::with_capacity(firmwares.len() + 1);
    parts.push(FilePart::json(ExperimentDescription::FILE_NAME, &description)?);
    parts.extend(firmwares);
    Ok(parts)
}
