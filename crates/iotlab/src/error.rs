//! CLI error types with miette diagnostics.
//!
//! Maps `iotlab_api::Error` and `ConfigError` into user-facing errors with
//! actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use iotlab_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the IoT-LAB API at {url}")]
    #[diagnostic(
        code(iotlab::connection_failed),
        help(
            "Check your network connection and the API URL.\n\
             Override it with --api-url or IOTLAB_API_URL."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS setup failed: {reason}")]
    #[diagnostic(
        code(iotlab::tls_error),
        help("Use --insecure (-k) to accept any certificate, or configure ca_cert.")
    )]
    TlsError { reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed (HTTP {status})")]
    #[diagnostic(
        code(iotlab::auth_failed),
        help(
            "Verify your username and password.\n\
             Store them with: iotlab auth -u <USER>"
        )
    )]
    AuthFailed { status: u16 },

    #[error("No credentials configured")]
    #[diagnostic(
        code(iotlab::no_credentials),
        help(
            "Store credentials with: iotlab auth -u <USER>\n\
             Or pass --user / --password, or set IOTLAB_USERNAME and IOTLAB_PASSWORD."
        )
    )]
    NoCredentials,

    // ── Resources ────────────────────────────────────────────────────
    #[error("Not found: {message}")]
    #[diagnostic(code(iotlab::not_found))]
    NotFound { message: String },

    #[error("You have no running experiment")]
    #[diagnostic(
        code(iotlab::no_running_experiment),
        help("Pass the experiment id with -i, or list them with: iotlab experiment list --state Waiting")
    )]
    NoRunningExperiment,

    #[error("You have several running experiments: {ids}")]
    #[diagnostic(
        code(iotlab::ambiguous_experiment),
        help("Pass the experiment id with -i.")
    )]
    AmbiguousExperiment { ids: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error (HTTP {status}): {body}")]
    #[diagnostic(code(iotlab::api_error))]
    ApiError { status: u16, body: String },

    #[error("Unexpected response from the API: {message}")]
    #[diagnostic(code(iotlab::invalid_response))]
    InvalidResponse { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(iotlab::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("{source}")]
    #[diagnostic(
        code(iotlab::config),
        help("Check the config file at {path}")
    )]
    Config {
        #[source]
        source: ConfigError,
        path: String,
    },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Operation '{action}' requires confirmation")]
    #[diagnostic(
        code(iotlab::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(iotlab::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("YAML rendering failed: {0}")]
    #[diagnostic(code(iotlab::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials => exit_code::AUTH,
            Self::NotFound { .. } | Self::NoRunningExperiment => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::AmbiguousExperiment { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── iotlab_api::Error → CliError ─────────────────────────────────────

impl From<iotlab_api::Error> for CliError {
    fn from(err: iotlab_api::Error) -> Self {
        use iotlab_api::Error;

        match err {
            Error::Transport(source) => CliError::ConnectionFailed {
                url: source
                    .url()
                    .map_or_else(|| "(unknown)".into(), ToString::to_string),
                source: Box::new(source),
            },

            Error::Tls(reason) => CliError::TlsError { reason },

            Error::InvalidUrl(e) => CliError::Validation {
                field: "api-url".into(),
                reason: e.to_string(),
            },

            Error::InvalidBaseUrl { url } => CliError::Validation {
                field: "api-url".into(),
                reason: format!("'{url}' cannot be used as a base URL"),
            },

            Error::Http { status, body } => match status {
                401 | 403 => CliError::AuthFailed { status },
                404 => CliError::NotFound { message: body },
                _ => CliError::ApiError { status, body },
            },

            Error::Contract { argument, reason } => CliError::Validation {
                field: argument,
                reason,
            },

            Error::Deserialization { message, .. } => CliError::InvalidResponse { message },

            Error::Serialization(e) => CliError::Json(e),
        }
    }
}

// ── ConfigError → CliError ───────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { .. } => CliError::NoCredentials,
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            source => CliError::Config {
                source,
                path: iotlab_config::config_path().display().to_string(),
            },
        }
    }
}
