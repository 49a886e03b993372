// iotlab-api: Async Rust client for the FIT IoT-LAB testbed REST API
//
// Layers, leaves first: `request` describes a call as data, `transport`
// performs one round trip, `response` interprets status and body, `Api`
// exposes one method per endpoint, and `SiteDirectory` memoizes the public
// site list.

pub mod auth;
pub mod client;
pub mod error;
mod experiments;
pub mod model;
mod nodes;
mod profiles;
pub mod request;
pub mod response;
pub mod sites;
pub mod transport;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod testing;

pub use auth::Credentials;
pub use client::{Api, DEFAULT_API_URL};
pub use error::Error;
pub use model::{
    Consumption, ExperimentDescription, FirmwareAssociation, InfoOption, Measures, NodeArch,
    NodeCommand, PowerMode, Profile, ProfileAssociation, Radio, Sensor,
};
pub use nodes::NODES_FILE_NAME;
pub use request::{ApiRequest, FilePart, Verb};
pub use response::{Payload, ResponseKind};
pub use sites::{SiteDirectory, site_names};
pub use transport::{HttpRequest, HttpTransport, RawResponse, TlsMode, Transport, TransportConfig};
