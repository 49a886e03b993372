// HTTP transport primitive
//
// One request in, one (status, bytes) pair out. The `Transport` trait is
// the seam the façade is generic over; `HttpTransport` is the reqwest
// implementation. Nothing here looks at the status code or the body --
// interpretation lives in `response`.

use std::future::Future;
use std::path::PathBuf;

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use tracing::{debug, trace};
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::request::{FilePart, Verb};

const USER_AGENT: &str = concat!("iotlab-cli/", env!("CARGO_PKG_VERSION"));

/// A fully resolved request, ready to go on the wire.
#[derive(Debug, Clone)]
pub struct HttpRequest<'a> {
    pub url: Url,
    pub verb: Verb,
    /// Attached as HTTP Basic auth when present.
    pub credentials: Option<&'a Credentials>,
}

/// Status code and undecoded body of a completed round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Performs exactly one HTTP round trip per call.
///
/// Implementations must not retry and must not inspect the status code.
/// Any failure to complete the exchange is reported as
/// [`Error::Transport`]; a completed exchange is always `Ok`, whatever its
/// status.
pub trait Transport: Send + Sync {
    fn execute(
        &self,
        request: HttpRequest<'_>,
    ) -> impl Future<Output = Result<RawResponse, Error>> + Send;
}

/// TLS verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the bundled web PKI roots.
    #[default]
    System,
    /// Trust an extra CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (self-hosted test deployments).
    DangerAcceptInvalid,
}

/// Settings for building the reqwest client behind [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::default(),
            user_agent: USER_AGENT.to_owned(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder().user_agent(&self.user_agent);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

/// reqwest-backed [`Transport`].
///
/// Holds no per-request state; cloning shares the connection pool.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: config.build_client()?,
        })
    }

    /// Wrap an existing client (tests, shared pools).
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl Transport for HttpTransport {
    async fn execute(&self, request: HttpRequest<'_>) -> Result<RawResponse, Error> {
        let HttpRequest {
            url,
            verb,
            credentials,
        } = request;

        debug!(method = %verb, %url, authenticated = credentials.is_some(), "sending request");

        let builder = match verb {
            Verb::Get => self.http.get(url),
            Verb::Delete => self.http.delete(url),
            Verb::Post(body) => {
                let bytes = serde_json::to_vec(&body).map_err(Error::Serialization)?;
                self.http
                    .post(url)
                    .header(CONTENT_TYPE, "application/json")
                    .body(bytes)
            }
            Verb::Multipart(parts) => self.http.post(url).multipart(multipart_form(parts)),
        };

        let builder = match credentials {
            Some(creds) => builder.basic_auth(creds.username(), Some(creds.password())),
            None => builder,
        };

        let resp = builder.send().await.map_err(Error::Transport)?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await.map_err(Error::Transport)?;

        trace!(status, len = body.len(), "response received");
        Ok(RawResponse { status, body })
    }
}

fn multipart_form(parts: Vec<FilePart>) -> Form {
    parts.into_iter().fold(Form::new(), |form, part| {
        let file = Part::bytes(part.content.to_vec()).file_name(part.name.clone());
        form.part(part.name, file)
    })
}
