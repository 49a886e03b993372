//! CLI configuration: a thin wrapper around `iotlab_config`.
//!
//! Applies `GlobalOpts` overrides (--api-url, --insecure, --output,
//! --user/--password) on top of the loaded file + environment config.

use clap::ValueEnum;
use secrecy::SecretString;
use tracing::{debug, warn};

use iotlab_api::{Api, Credentials};
use iotlab_config::{Config, ConfigError};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use iotlab_config::{load_config_file, save_config, store_password};

/// Load file + env config and apply flag overrides.
pub fn effective_config(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut config = iotlab_config::load_config()?;
    if let Some(ref url) = global.api_url {
        config.api_url = Some(url.clone());
    }
    if global.insecure {
        config.insecure = true;
    }
    Ok(config)
}

/// `--output`, else the config file's `output`, else JSON.
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    global.output.unwrap_or_else(|| {
        OutputFormat::from_str(&config.output, true).unwrap_or_else(|_| {
            warn!(output = %config.output, "unknown output format in config, using json");
            OutputFormat::Json
        })
    })
}

/// Credentials from flags, env, keyring or config.
///
/// Prompts for the password when `--user` was given without any password
/// source.
pub fn resolve_credentials(global: &GlobalOpts, config: &Config) -> Result<Credentials, CliError> {
    let flag = global.password.clone().map(SecretString::from);
    match iotlab_config::resolve_credentials(config, global.user.as_deref(), flag) {
        Ok(credentials) => {
            debug!(username = credentials.username(), "resolved credentials");
            Ok(credentials)
        }
        Err(ConfigError::NoCredentials {
            username: Some(username),
        }) if global.user.is_some() => {
            let password = SecretString::from(rpassword::prompt_password("Password: ")?);
            Ok(Credentials::new(username, password))
        }
        Err(e) => Err(e.into()),
    }
}

/// Authenticated client for `config`.
pub fn build_api(global: &GlobalOpts, config: &Config) -> Result<Api, CliError> {
    let credentials = resolve_credentials(global, config)?;
    Ok(Api::new(
        config.api_url(),
        credentials,
        &config.transport_config(),
    )?)
}
