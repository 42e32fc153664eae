//! Authenticated single-call execution.
//!
//! One call to [`RequestExecutor::execute`] is one HTTP exchange: the body is
//! normalized and encoded, a fresh username/token pair is attached, and the
//! status code is mapped onto [`ClientError`]. A 2xx body is decoded into the
//! caller's type but its embedded `error` field is left for the caller to
//! inspect, since its meaning differs per endpoint.

use confidant_kmsauth::TokenGenerator;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};
use crate::types::ServiceUpdate;

/// Header naming the caller, `{version}/{user_type}/{from}`.
pub const AUTH_FROM_HEADER: &str = "X-Auth-From";

/// Header carrying the base64 token.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Signs and sends store requests.
pub struct RequestExecutor {
    base_url: String,
    transport: Arc<dyn Transport>,
    tokens: TokenGenerator,
}

impl RequestExecutor {
    /// Create an executor for the store at `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        tokens: TokenGenerator,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            transport,
            tokens,
        }
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Token generator used for every request.
    pub fn tokens(&self) -> &TokenGenerator {
        &self.tokens
    }

    /// `GET path`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(Method::Get, path, None).await
    }

    /// `PUT path`, with an optional service body.
    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<ServiceUpdate>,
    ) -> Result<T> {
        self.execute(Method::Put, path, body).await
    }

    /// Perform exactly one store call.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<ServiceUpdate>,
    ) -> Result<T> {
        let body = match body {
            Some(update) => serde_json::to_vec(&update.normalized())?,
            None => Vec::new(),
        };

        let username = self.tokens.username();
        let token = self.tokens.token().await?;

        let request = HttpRequest {
            method,
            url: format!("{}{}", self.base_url, path),
            headers: vec![
                (AUTH_FROM_HEADER.to_string(), username),
                (AUTH_TOKEN_HEADER.to_string(), token),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body,
        };

        debug!(
            %method,
            path,
            transport = self.transport.name(),
            "sending store request"
        );

        let response = self.transport.send(request).await?;
        debug!(%method, path, status = response.status, "store responded");
        interpret(response)
    }
}

/// Map a response onto the caller's type or an error kind.
fn interpret<T: DeserializeOwned>(response: HttpResponse) -> Result<T> {
    match response.status {
        404 => Err(ClientError::NotFound),
        403 => Err(ClientError::Forbidden),
        status if !(200..300).contains(&status) => Err(ClientError::RequestFailed {
            status,
            body: String::from_utf8_lossy(&response.body).into_owned(),
        }),
        _ => Ok(serde_json::from_slice(&response.body)?),
    }
}
