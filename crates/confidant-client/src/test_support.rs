//! In-memory doubles shared by the unit tests.

use async_trait::async_trait;
use confidant_kmsauth::{EncryptionContext, Encryptor, TokenGenerator};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use crate::client::ConfidantClient;
use crate::request::RequestExecutor;
use crate::retry::{RetryPolicy, Sleeper};
use crate::transport::{HttpRequest, HttpResponse, Transport, TransportError};

pub(crate) const BASE_URL: &str = "http://confidant.test";

#[derive(Clone)]
enum Scripted {
    Response(HttpResponse),
    Failure(String),
}

/// Transport answering from per-route queues keyed by `"METHOD /path"`.
///
/// Each route pops its queue front until one entry is left, which then
/// answers every further call.
#[derive(Default)]
pub(crate) struct MockTransport {
    routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
    requests: Mutex<Vec<HttpRequest>>,
    latency: Mutex<Option<Duration>>,
}

impl MockTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, route: &str, scripted: Scripted) {
        self.routes
            .lock()
            .entry(route.to_string())
            .or_default()
            .push_back(scripted);
    }

    pub(crate) fn respond(&self, route: &str, status: u16, body: Value) {
        let body = serde_json::to_vec(&body).unwrap();
        self.push(route, Scripted::Response(HttpResponse { status, body }));
    }

    pub(crate) fn respond_raw(&self, route: &str, status: u16, body: &[u8]) {
        self.push(
            route,
            Scripted::Response(HttpResponse {
                status,
                body: body.to_vec(),
            }),
        );
    }

    pub(crate) fn fail(&self, route: &str, message: &str) {
        self.push(route, Scripted::Failure(message.to_string()));
    }

    /// Delay every answer by `latency`, yielding to other tasks meanwhile.
    pub(crate) fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = Some(latency);
    }

    /// `"METHOD /path"` of every request, in order.
    pub(crate) fn routes(&self) -> Vec<String> {
        self.requests().iter().map(route_of).collect()
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// Requests sent to `route`, in order.
    pub(crate) fn requests_to(&self, route: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| route_of(r) == route)
            .collect()
    }

    /// Decoded JSON bodies sent to `route`.
    pub(crate) fn bodies_to(&self, route: &str) -> Vec<Value> {
        self.requests_to(route)
            .iter()
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect()
    }
}

fn route_of(request: &HttpRequest) -> String {
    let path = request.url.strip_prefix(BASE_URL).unwrap_or(&request.url);
    format!("{} {}", request.method, path)
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let route = route_of(&request);
        self.requests.lock().push(request);

        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let scripted = {
            let mut routes = self.routes.lock();
            let queue = routes.get_mut(&route);
            match queue {
                Some(q) if q.len() > 1 => q.pop_front(),
                Some(q) => q.front().cloned(),
                None => None,
            }
        };

        match scripted {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::Failure(message)) => Err(TransportError::Socket(message)),
            None => Err(TransportError::Socket(format!(
                "no scripted response for {route}"
            ))),
        }
    }
}

/// Encryptor whose ciphertext is always `token`.
pub(crate) struct FixedEncryptor;

#[async_trait]
impl Encryptor for FixedEncryptor {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn encrypt(
        &self,
        _key_id: &str,
        _plaintext: &[u8],
        _context: &EncryptionContext,
    ) -> confidant_kmsauth::Result<Vec<u8>> {
        Ok(b"token".to_vec())
    }
}

pub(crate) fn tokens() -> TokenGenerator {
    TokenGenerator::new(
        "key",
        "confidant",
        "client-tests",
        "user",
        Arc::new(FixedEncryptor),
    )
}

pub(crate) fn executor(transport: Arc<MockTransport>) -> RequestExecutor {
    RequestExecutor::new(BASE_URL, transport, tokens())
}

/// Sleeper that records requested pauses and returns immediately.
#[derive(Default)]
pub(crate) struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn pauses(&self) -> Vec<Duration> {
        self.slept.lock().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().push(duration);
    }
}

/// Client over `transport` with the default retry policy and no real pauses.
pub(crate) fn client(transport: Arc<MockTransport>) -> (ConfidantClient, Arc<RecordingSleeper>) {
    let sleeper = RecordingSleeper::new();
    let client = ConfidantClient::new(BASE_URL, transport, tokens())
        .with_retry_policy(RetryPolicy::default())
        .with_sleeper(sleeper.clone());
    (client, sleeper)
}
