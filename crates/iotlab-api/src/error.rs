use thiserror::Error;

/// Top-level error type for the `iotlab-api` crate.
///
/// Every façade call funnels its failures through this enum: the network
/// round trip itself, a non-200 answer from the REST service, an argument
/// rejected before anything was sent, or a 200 body that is not what the
/// endpoint promised. The CLI maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Failed to assemble the underlying HTTP client (TLS roots, CA file).
    #[error("TLS error: {0}")]
    Tls(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The API base URL cannot carry path segments (e.g. `mailto:`).
    #[error("Invalid API base URL: {url}")]
    InvalidBaseUrl { url: String },

    // ── HTTP ────────────────────────────────────────────────────────
    /// The request completed with a status other than 200.
    ///
    /// All non-success statuses land here; 4xx and 5xx are not split.
    #[error("HTTP error: {status}\n{body}")]
    Http { status: u16, body: String },

    // ── Caller contract ─────────────────────────────────────────────
    /// An argument outside the documented domain. Raised before any
    /// request is issued.
    #[error("Invalid {argument}: {reason}")]
    Contract { argument: String, reason: String },

    // ── Data ────────────────────────────────────────────────────────
    /// A 200 body failed to decode as the endpoint's documented shape,
    /// with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// An outgoing payload could not be encoded as JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),
}

impl Error {
    /// HTTP status carried by this error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns `true` if the server rejected the credentials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// Returns `true` if the network call itself failed.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
