// REST API façade
//
// `Api` pairs a transport with the API root and the caller's credentials.
// Endpoint groups (experiments, nodes, profiles, sites) are implemented as
// inherent methods in separate files; this module only holds the plumbing
// that turns an `ApiRequest` into a decoded payload.

use bytes::Bytes;
use serde_json::Value;
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::request::{ApiRequest, parse_base_url};
use crate::response::{self, Payload, ResponseKind};
use crate::transport::{HttpRequest, HttpTransport, RawResponse, Transport, TransportConfig};

/// Production REST endpoint of the testbed.
pub const DEFAULT_API_URL: &str = "https://www.iot-lab.info/rest/";

/// Authenticated client for the testbed REST API.
///
/// Every endpoint method issues exactly one request and decodes the answer
/// into the shape that endpoint is documented to return: JSON for most,
/// plain text for profile add/delete confirmations, raw bytes for the
/// experiment archive.
pub struct Api<T = HttpTransport> {
    transport: T,
    base_url: Url,
    credentials: Credentials,
}

impl Api<HttpTransport> {
    /// Build a client backed by reqwest.
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        Self::with_transport(HttpTransport::new(transport)?, base_url, credentials)
    }
}

impl<T: Transport> Api<T> {
    /// Build a client over any [`Transport`].
    pub fn with_transport(
        transport: T,
        base_url: &str,
        credentials: Credentials,
    ) -> Result<Self, Error> {
        Ok(Self {
            transport,
            base_url: parse_base_url(base_url)?,
            credentials,
        })
    }

    /// The API root every request path is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn username(&self) -> &str {
        self.credentials.username()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Issue `request` with this client's credentials and decode the
    /// response as `kind`.
    pub async fn call(&self, request: ApiRequest, kind: ResponseKind) -> Result<Payload, Error> {
        let raw = self.send(request).await?;
        response::interpret(raw, kind)
    }

    pub(crate) async fn json(&self, request: ApiRequest) -> Result<Value, Error> {
        response::interpret_json(self.send(request).await?)
    }

    pub(crate) async fn text(&self, request: ApiRequest) -> Result<String, Error> {
        response::interpret_text(self.send(request).await?)
    }

    pub(crate) async fn binary(&self, request: ApiRequest) -> Result<Bytes, Error> {
        response::interpret_binary(self.send(request).await?)
    }

    async fn send(&self, request: ApiRequest) -> Result<RawResponse, Error> {
        let url = request.url(&self.base_url)?;
        self.transport
            .execute(HttpRequest {
                url,
                verb: request.into_verb(),
                credentials: Some(&self.credentials),
            })
            .await
    }
}
