// Profile endpoints
//
// Named measurement/power configurations. Add and delete answer with a
// plain-text confirmation, not JSON.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::client::Api;
use crate::error::Error;
use crate::request::ApiRequest;
use crate::transport::Transport;

impl<T: Transport> Api<T> {
    /// `GET profiles`
    pub async fn get_profiles(&self) -> Result<Value, Error> {
        self.json(ApiRequest::get("profiles")).await
    }

    /// `GET profiles/{name}`
    pub async fn get_profile(&self, name: &str) -> Result<Value, Error> {
        self.json(ApiRequest::get("profiles").segment(name)).await
    }

    /// Store `profile` under `name`; returns the service's confirmation text.
    ///
    /// `POST profiles/{name}` with the profile as JSON.
    pub async fn add_profile(&self, name: &str, profile: &impl Serialize) -> Result<String, Error> {
        let body = serde_json::to_value(profile).map_err(Error::Serialization)?;
        debug!(name, "adding profile");
        self.text(ApiRequest::post("profiles", body).segment(name))
            .await
    }

    /// `DELETE profiles/{name}`; returns the confirmation text.
    pub async fn del_profile(&self, name: &str) -> Result<String, Error> {
        debug!(name, "deleting profile");
        self.text(ApiRequest::delete("profiles").segment(name)).await
    }
}
