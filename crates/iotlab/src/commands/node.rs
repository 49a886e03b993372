//! Node command handlers.

use iotlab_api::{Api, NodeCommand as Action};

use crate::cli::{GlobalOpts, NodeArgs, NodeCommand, NodeTarget, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    api: &Api,
    args: NodeArgs,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    let value = match args.command {
        NodeCommand::Start(target) => run(api, Action::Start, target).await?,
        NodeCommand::Stop(target) => run(api, Action::Stop, target).await?,
        NodeCommand::Reset(target) => run(api, Action::Reset, target).await?,
        NodeCommand::Update { firmware, target } => {
            let part = util::firmware_part(&firmware)?;
            let id = util::resolve_experiment_id(api, target.id).await?;
            api.update_firmware(id, part, &target.nodes).await?
        }
    };

    output::print_output(&output::render_value(format, &value)?, global.quiet);
    Ok(())
}

async fn run(api: &Api, action: Action, target: NodeTarget) -> Result<serde_json::Value, CliError> {
    let id = util::resolve_experiment_id(api, target.id).await?;
    Ok(api.node_command(action, id, &target.nodes).await?)
}
