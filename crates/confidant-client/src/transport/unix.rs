//! HTTP over a local socket.
//!
//! The socket is expected to be a forwarding proxy: requests go out with the
//! path as the target and the configured store's host in the `Host` header.

use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use hyperlocal::UnixConnector;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use super::{HttpRequest, HttpResponse, Transport, TransportError};

/// Transport that tunnels every request through a unix socket.
pub struct UnixSocketTransport {
    socket_path: PathBuf,
    client: Client<UnixConnector, Full<Bytes>>,
    timeout: Duration,
}

impl UnixSocketTransport {
    /// Create a transport for `socket_path`; each exchange is bounded by `timeout`.
    pub fn new(socket_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        // One connection per request, nothing pooled.
        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(0)
            .build(UnixConnector);

        Self {
            socket_path: socket_path.into(),
            client,
            timeout,
        }
    }

    /// Path of the proxy socket.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    fn build(&self, request: HttpRequest) -> Result<hyper::Request<Full<Bytes>>, TransportError> {
        let url = url::Url::parse(&request.url)
            .map_err(|e| TransportError::InvalidRequest(format!("{}: {e}", request.url)))?;

        let mut target = url.path().to_string();
        if let Some(query) = url.query() {
            target.push('?');
            target.push_str(query);
        }
        let uri: hyper::Uri = hyperlocal::Uri::new(&self.socket_path, &target).into();

        let mut builder = hyper::Request::builder()
            .method(request.method.as_str())
            .uri(uri);

        if let Some(host) = url.host_str() {
            let host = match url.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_string(),
            };
            builder = builder.header(hyper::header::HOST, host);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder
            .body(Full::new(Bytes::from(request.body)))
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))
    }
}

#[async_trait]
impl Transport for UnixSocketTransport {
    fn name(&self) -> &str {
        "unix"
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let request = self.build(request)?;
        debug!(socket = %self.socket_path.display(), uri = %request.uri(), "sending over unix socket");

        let exchange = async {
            let response = self
                .client
                .request(request)
                .await
                .map_err(|e| TransportError::Socket(e.to_string()))?;
            let status = response.status().as_u16();
            let body = response
                .into_body()
                .collect()
                .await
                .map_err(|e| TransportError::Socket(e.to_string()))?
                .to_bytes();

            Ok(HttpResponse {
                status,
                body: body.to_vec(),
            })
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| TransportError::Timeout(self.timeout.as_secs()))?
    }
}
