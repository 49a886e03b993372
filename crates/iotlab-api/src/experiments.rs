// Experiment endpoints
//
// Everything under `experiments`: testbed resources, submission, listing,
// per-experiment info and stop.

use bytes::Bytes;
use serde_json::Value;
use tracing::debug;

use crate::client::Api;
use crate::error::Error;
use crate::model::{ExperimentDescription, InfoOption};
use crate::request::{ApiRequest, FilePart};
use crate::response::Payload;
use crate::transport::Transport;

impl<T: Transport> Api<T> {
    /// Testbed resources description.
    ///
    /// `GET experiments?resources` or, with `list_id`, `GET experiments?id`
    /// (compact `3-12+35` node lists). `site` restricts to one site.
    pub async fn get_resources(&self, list_id: bool, site: Option<&str>) -> Result<Value, Error> {
        let mut request =
            ApiRequest::get("experiments").flag(if list_id { "id" } else { "resources" });
        if let Some(site) = site {
            request = request.param("site", site);
        }
        debug!(list_id, ?site, "fetching resources");
        self.json(request).await
    }

    /// Submit an experiment from pre-built multipart files.
    ///
    /// `POST experiments` (multipart). The parts are the experiment
    /// description plus any firmware images it references.
    pub async fn submit_experiment(&self, files: Vec<FilePart>) -> Result<Value, Error> {
        debug!(files = files.len(), "submitting experiment");
        self.json(ApiRequest::multipart("experiments", files)).await
    }

    /// Submit `description` with its firmware images.
    pub async fn submit(
        &self,
        description: &ExperimentDescription,
        firmwares: Vec<FilePart>,
    ) -> Result<Value, Error> {
        let mut files = Vec::with_capacity(firmwares.len() + 1);
        files.push(FilePart::json(ExperimentDescription::FILE_NAME, description)?);
        files.extend(firmwares);
        self.submit_experiment(files).await
    }

    /// The user's experiments in `state`.
    ///
    /// `GET experiments?state=..&limit=..&offset=..`; `limit = 0` means no limit.
    pub async fn get_experiments(&self, state: &str, limit: u32, offset: u32) -> Result<Value, Error> {
        let request = ApiRequest::get("experiments")
            .param("state", state)
            .param("limit", limit)
            .param("offset", offset);
        self.json(request).await
    }

    /// Experiment description, narrowed by `option`.
    ///
    /// `option` must be one of `''`, `resources`, `id`, `state`, `data`;
    /// anything else fails with [`Error::Contract`] before a request is
    /// sent. `data` yields [`Payload::Binary`] (the tar.gz archive), every
    /// other option [`Payload::Json`].
    pub async fn get_experiment_info(&self, id: u32, option: &str) -> Result<Payload, Error> {
        let option = InfoOption::parse(option)?;
        let mut request = ApiRequest::get("experiments").segment(id);
        if let Some(flag) = option.query_flag() {
            request = request.flag(flag);
        }
        debug!(id, %option, "fetching experiment info");
        self.call(request, option.response_kind()).await
    }

    /// Experiment archive (description + firmwares) as tar.gz bytes.
    pub async fn experiment_archive(&self, id: u32) -> Result<Bytes, Error> {
        self.binary(ApiRequest::get("experiments").segment(id).flag("data"))
            .await
    }

    /// `DELETE experiments/{id}`
    pub async fn stop_experiment(&self, id: u32) -> Result<Value, Error> {
        debug!(id, "stopping experiment");
        self.json(ApiRequest::delete("experiments").segment(id)).await
    }
}
