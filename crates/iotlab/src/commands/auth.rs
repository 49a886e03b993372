//! `iotlab auth`: remember credentials for later commands.
//!
//! The username goes to the config file, the password to the system
//! keyring. Nothing is sent to the API.

use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let username = global.user.clone().ok_or_else(|| CliError::Validation {
        field: "user".into(),
        reason: "`iotlab auth` needs --user".into(),
    })?;

    let password = match global.password {
        Some(ref pw) => SecretString::from(pw.clone()),
        None => password_prompt()?,
    };

    config::store_password(&username, password.expose_secret())?;

    let mut cfg = config::load_config_file()?;
    cfg.username = Some(username.clone());
    let path = config::save_config(&cfg)?;
    info!(username, path = %path.display(), "credentials stored");

    output::print_status("Written", global.quiet);
    Ok(())
}

/// Ask twice until both entries match.
fn password_prompt() -> Result<SecretString, CliError> {
    loop {
        let first = rpassword::prompt_password("Password: ")?;
        let second = rpassword::prompt_password("Retype password: ")?;
        if first == second {
            return Ok(SecretString::from(first));
        }
        eprintln!("Passwords do not match. Try again");
    }
}
