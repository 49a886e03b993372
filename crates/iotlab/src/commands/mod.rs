//! Command dispatch: bridges CLI args -> API calls -> output formatting.

pub mod auth;
pub mod experiment;
pub mod node;
pub mod profile;
pub mod sites;
pub mod util;

use iotlab_api::Api;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Commands that need an authenticated client.
#[derive(Debug)]
pub enum ApiCommand {
    Experiment(crate::cli::ExperimentArgs),
    Node(crate::cli::NodeArgs),
    Profile(crate::cli::ProfileArgs),
}

/// Dispatch an authenticated command to its handler.
pub async fn dispatch(
    cmd: ApiCommand,
    api: &Api,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    match cmd {
        ApiCommand::Experiment(args) => experiment::handle(api, args, global, format).await,
        ApiCommand::Node(args) => node::handle(api, args, global, format).await,
        ApiCommand::Profile(args) => profile::handle(api, args, global, format).await,
    }
}
