mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use iotlab_api::SiteDirectory;

use crate::cli::{Cli, Command};
use crate::commands::ApiCommand;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Logs go to stderr; stdout is reserved for command output.
fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Cli { global, command } = cli;

    let command = match command {
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "iotlab", &mut std::io::stdout());
            return Ok(());
        }

        Command::Auth => return commands::auth::handle(&global),

        Command::Sites => {
            let config = config::effective_config(&global)?;
            let format = config::output_format(&global, &config);
            let directory = SiteDirectory::new();
            return commands::sites::handle(&directory, &config, &global, format).await;
        }

        Command::Experiment(args) => ApiCommand::Experiment(args),
        Command::Node(args) => ApiCommand::Node(args),
        Command::Profile(args) => ApiCommand::Profile(args),
    };

    let config = config::effective_config(&global)?;
    let format = config::output_format(&global, &config);
    let api = config::build_api(&global, &config)?;

    tracing::debug!(command = ?command, api_url = %api.base_url(), "dispatching command");
    commands::dispatch(command, &api, &global, format).await
}
