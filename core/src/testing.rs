//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::client::HarvestClient;
use crate::config::HarvestConfig;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{AsyncTransport, Transport, TransportError};

pub(crate) const BASE_URL: &str = "https://acme.harvestapp.com";

#[derive(Default)]
struct Script {
    responses: VecDeque<HttpResponse>,
    requests: Vec<HttpRequest>,
}

/// Replays queued responses in order and records every request it sees.
/// Clones share the same script.
#[derive(Clone, Default)]
pub(crate) struct FakeTransport {
    script: Arc<Mutex<Script>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, status: u16, body: &str) {
        self.respond_with(HttpResponse::new(status, body));
    }

    pub(crate) fn respond_with(&self, response: HttpResponse) {
        self.script.lock().unwrap().responses.push_back(response);
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.script.lock().unwrap().requests.clone()
    }

    fn next(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut script = self.script.lock().unwrap();
        script.requests.push(request);
        script
            .responses
            .pop_front()
            .ok_or_else(|| TransportError::Connection("no scripted response".to_string()))
    }
}

impl Transport for FakeTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.next(request)
    }
}

impl AsyncTransport for FakeTransport {
    async fn execute_async(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.next(request)
    }
}

/// A client sharing `fake`'s script.
pub(crate) fn fake_client(fake: &FakeTransport) -> HarvestClient<FakeTransport> {
    HarvestClient::new(HarvestConfig::new(BASE_URL), fake.clone())
}
