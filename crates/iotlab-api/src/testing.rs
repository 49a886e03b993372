// In-memory transport double for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use secrecy::SecretString;

use crate::auth::Credentials;
use crate::client::Api;
use crate::error::Error;
use crate::request::Verb;
use crate::transport::{HttpRequest, RawResponse, Transport};

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub method: &'static str,
    pub url: String,
    pub username: Option<String>,
    pub verb: Verb,
}

/// Replays queued responses in order and records every request.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    responses: Mutex<VecDeque<RawResponse>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new(responses: impl IntoIterator<Item = RawResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: Mutex::default(),
        }
    }

    pub fn ok(body: &str) -> Self {
        Self::new([RawResponse::new(200, body.to_owned())])
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    async fn execute(&self, request: HttpRequest<'_>) -> Result<RawResponse, Error> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: request.verb.method(),
            url: request.url.to_string(),
            username: request.credentials.map(|c| c.username().to_owned()),
            verb: request.verb,
        });
        let next = self.responses.lock().unwrap().pop_front();
        Ok(next.expect("MockTransport ran out of responses"))
    }
}

pub(crate) fn credentials() -> Credentials {
    Credentials::new("alice", SecretString::from("secret"))
}

pub(crate) fn api(transport: MockTransport) -> Api<MockTransport> {
    Api::with_transport(transport, "https://www.iot-lab.info/rest/", credentials()).unwrap()
}
