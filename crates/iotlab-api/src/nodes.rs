// Node endpoints
//
// Commands applied to the nodes of a running experiment.

use serde_json::Value;
use tracing::debug;

use crate::client::Api;
use crate::error::Error;
use crate::model::NodeCommand;
use crate::request::{ApiRequest, FilePart};
use crate::transport::Transport;

/// Multipart file name carrying the target node list of a firmware update.
pub const NODES_FILE_NAME: &str = "nodes.json";

impl<T: Transport> Api<T> {
    /// Run `command` on `nodes` of experiment `id`.
    ///
    /// `POST experiments/{id}/nodes?{command}` with the node list as a JSON
    /// array. An empty list applies the command to every node.
    pub async fn node_command(
        &self,
        command: NodeCommand,
        id: u32,
        nodes: &[String],
    ) -> Result<Value, Error> {
        debug!(id, %command, nodes = nodes.len(), "node command");
        let request = ApiRequest::post("experiments", Value::from(nodes.to_vec()))
            .segment(id)
            .segment("nodes")
            .flag(command.as_ref());
        self.json(request).await
    }

    /// Flash firmware from pre-built multipart files.
    ///
    /// `POST experiments/{id}/nodes?update` (multipart).
    pub async fn node_update(&self, id: u32, files: Vec<FilePart>) -> Result<Value, Error> {
        debug!(id, files = files.len(), "node firmware update");
        let request = ApiRequest::multipart("experiments", files)
            .segment(id)
            .segment("nodes")
            .flag("update");
        self.json(request).await
    }

    /// Flash `firmware` on `nodes` (all nodes when empty).
    pub async fn update_firmware(
        &self,
        id: u32,
        firmware: FilePart,
        nodes: &[String],
    ) -> Result<Value, Error> {
        let files = vec![FilePart::json(NODES_FILE_NAME, &nodes)?, firmware];
        self.node_update(id, files).await
    }
}
