//! Shared configuration for the IoT-LAB command-line tools.
//!
//! TOML file + `IOTLAB_*` environment, credential resolution
//! (flag, env, keyring, plaintext) and translation to the client's
//! `TransportConfig`. The CLI layers its `GlobalOpts` overrides on top.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use iotlab_api::request::parse_base_url;
use iotlab_api::{Credentials, DEFAULT_API_URL, TlsMode, TransportConfig};

/// Keyring service name; entries are keyed by username.
pub const KEYRING_SERVICE: &str = "iotlab";

/// Environment variable consulted for the password before the keyring.
pub const PASSWORD_ENV: &str = "IOTLAB_PASSWORD";

const ENV_PREFIX: &str = "IOTLAB_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured{}", .username.as_ref().map(|u| format!(" for user '{u}'")).unwrap_or_default())]
    NoCredentials { username: Option<String> },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// REST API root; the production endpoint when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Testbed account name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password (plaintext, prefer the keyring).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Accept invalid TLS certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Extra CA certificate (PEM).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Default output format.
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            username: None,
            password: None,
            insecure: false,
            ca_cert: None,
            output: default_output(),
        }
    }
}

fn default_output() -> String {
    "json".into()
}

impl Config {
    /// The REST API root to talk to.
    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    /// TLS settings for the HTTP client. `insecure` wins over `ca_cert`.
    pub fn transport_config(&self) -> TransportConfig {
        let tls = if self.insecure {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref ca) = self.ca_cert {
            TlsMode::CustomCa(ca.clone())
        } else {
            TlsMode::System
        };

        TransportConfig {
            tls,
            ..TransportConfig::default()
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("info", "iot-lab", "iotlab").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("iotlab");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from `path` + environment. A missing file is not an
/// error; defaults apply.
///
/// `IOTLAB_PASSWORD` is not merged here; [`resolve_password`] reads it
/// ahead of the keyring.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["password"]));

    let config: Config = figment.extract()?;
    if let Some(ref url) = config.api_url {
        parse_base_url(url).map_err(|e| ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("'{url}': {e}"),
        })?;
    }
    Ok(config)
}

/// The config file alone, without `IOTLAB_*` overrides. Anything written
/// back with [`save_config`] starts from here.
pub fn load_config_file() -> Result<Config, ConfigError> {
    load_config_file_from(&config_path())
}

pub fn load_config_file_from(path: &Path) -> Result<Config, ConfigError> {
    let config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Username from the command line, else from config/env.
pub fn resolve_username(config: &Config, flag: Option<&str>) -> Option<String> {
    flag.map(str::to_owned).or_else(|| config.username.clone())
}

/// Password for `username`: flag, then `IOTLAB_PASSWORD`, then the system
/// keyring, then the plaintext config value.
pub fn resolve_password(
    config: &Config,
    username: &str,
    flag: Option<SecretString>,
) -> Option<SecretString> {
    resolve_password_with(config, username, flag, keyring_password)
}

/// [`resolve_password`] with a pluggable keyring lookup.
pub fn resolve_password_with(
    config: &Config,
    username: &str,
    flag: Option<SecretString>,
    keyring: impl FnOnce(&str) -> Option<String>,
) -> Option<SecretString> {
    if flag.is_some() {
        return flag;
    }

    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        debug!("password from environment");
        return Some(SecretString::from(pw));
    }

    if let Some(pw) = keyring(username) {
        debug!(username, "password from keyring");
        return Some(SecretString::from(pw));
    }

    config.password.clone().map(SecretString::from)
}

/// Resolve full credentials, without prompting.
pub fn resolve_credentials(
    config: &Config,
    user_flag: Option<&str>,
    password_flag: Option<SecretString>,
) -> Result<Credentials, ConfigError> {
    let username =
        resolve_username(config, user_flag).ok_or(ConfigError::NoCredentials { username: None })?;
    let password = resolve_password(config, &username, password_flag).ok_or_else(|| {
        ConfigError::NoCredentials {
            username: Some(username.clone()),
        }
    })?;
    Ok(Credentials::new(username, password))
}

fn keyring_password(username: &str) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, username)
        .and_then(|entry| entry.get_password())
        .ok()
}

/// Store `password` for `username` in the system keyring.
pub fn store_password(username: &str, password: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, username)?;
    entry.set_password(password)?;
    Ok(())
}
