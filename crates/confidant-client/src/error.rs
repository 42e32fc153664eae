//! Error types for store operations.

use confidant_kmsauth::AuthError;
use thiserror::Error;

use crate::transport::TransportError;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Client error types.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced an HTTP response.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The auth token could not be derived.
    #[error("Token derivation failed: {0}")]
    Auth(#[from] AuthError),

    /// A 2xx body did not match the expected shape, or a body failed to encode.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store answered 404.
    #[error("NotFound")]
    NotFound,

    /// The store answered 403.
    #[error("Forbidden")]
    Forbidden,

    /// The store answered with another non-2xx status.
    #[error("Request failed: got status code {status} with body {body}")]
    RequestFailed { status: u16, body: String },

    /// A 2xx response carried an `error` field.
    #[error("Store error: {0}")]
    Store(String),

    /// The named service is unknown to the store.
    #[error("Service doesn't exist: {0}")]
    ServiceNotFound(String),

    /// Create was asked for a service that is already there.
    #[error("Service already exists: {0}")]
    AlreadyExists(String),

    /// The service name is not among the store's permitted identities.
    #[error("Invalid IAM role: {0}")]
    InvalidRole(String),

    /// One or more credential names did not resolve.
    #[error("The following credentials do not exist: {}", .names.join(", "))]
    UnresolvedCredentials { names: Vec<String> },

    /// The store said grants can never be created for this service.
    #[error("Failed to create KMS grants for {service}, got {reason}")]
    TerminalGrant { service: String, reason: String },

    /// Grants never became complete within the attempt budget.
    #[error("Failed to create KMS grants for {service} after {attempts} attempts")]
    GrantTimeout { service: String, attempts: u32 },

    /// Client construction failed.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Create a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
