//! Wire types for the store API.
//!
//! Every response type tolerates missing fields and `null` lists. Responses
//! that can carry an `error` field on a 2xx status implement [`StoreReply`]
//! so callers can check them after a successful transport call.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{ClientError, Result};

/// Decode `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A 2xx response that may still describe a failure.
pub trait StoreReply {
    /// The embedded error message, if the store reported one.
    fn embedded_error(&self) -> Option<&str>;

    /// Turn an embedded error into [`ClientError::Store`].
    fn check(self) -> Result<Self>
    where
        Self: Sized,
    {
        match self.embedded_error() {
            Some(message) => Err(ClientError::store(message)),
            None => Ok(self),
        }
    }
}

fn non_empty(error: &Option<String>) -> Option<&str> {
    error.as_deref().filter(|e| !e.is_empty())
}

/// A stored secret. The pairs are opaque to the client.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credential {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,

    #[serde(deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(deserialize_with = "null_as_default")]
    pub credential_pairs: HashMap<String, String>,

    pub enabled: bool,

    pub revision: i64,
}

impl Credential {
    /// A credential known only by ID and name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

// Pair values never reach logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.credential_pairs.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("credential_pairs", &keys)
            .field("enabled", &self.enabled)
            .field("revision", &self.revision)
            .finish()
    }
}

/// A service and the credentials it may decrypt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Service {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,

    pub enabled: bool,

    /// Zero means the store has no prior state for this service.
    pub revision: i64,

    #[serde(deserialize_with = "null_as_default")]
    pub credentials: Vec<Credential>,

    /// Passed through untouched.
    #[serde(deserialize_with = "null_as_default")]
    pub blind_credentials: Vec<serde_json::Value>,

    #[serde(deserialize_with = "null_as_default")]
    pub account: String,

    #[serde(deserialize_with = "null_as_default")]
    pub modified_by: String,

    #[serde(deserialize_with = "null_as_default")]
    pub modified_date: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StoreReply for Service {
    fn embedded_error(&self) -> Option<&str> {
        non_empty(&self.error)
    }
}

/// Response of the single-service endpoints.
///
/// Accepts both the bare service object and the `{result, service, error}`
/// envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceResponse {
    #[serde(default)]
    service: Option<Service>,

    #[serde(flatten)]
    flat: Service,
}

impl ServiceResponse {
    /// The service, or the embedded error from either shape.
    pub fn into_service(self) -> Result<Service> {
        let flat = self.flat.check()?;
        match self.service {
            Some(service) => service.check(),
            None => Ok(flat),
        }
    }
}

/// `GET /v1/services`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServicesResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub services: Vec<Service>,
}

/// `GET /v1/credentials`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub credentials: Vec<Credential>,

    #[serde(default)]
    pub error: Option<String>,
}

impl StoreReply for CredentialsResponse {
    fn embedded_error(&self) -> Option<&str> {
        non_empty(&self.error)
    }
}

/// `GET /v1/roles`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RolesResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub roles: Vec<String>,
}

/// Whether the caller's identity may encrypt and decrypt for a service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grants {
    pub encrypt_grant: bool,
    pub decrypt_grant: bool,
}

impl Grants {
    /// Both grants are in place.
    pub fn is_complete(&self) -> bool {
        self.encrypt_grant && self.decrypt_grant
    }
}

/// `GET|PUT /v1/grants/{name}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GrantsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub grants: Grants,

    #[serde(default)]
    pub error: Option<String>,
}

impl StoreReply for GrantsResponse {
    fn embedded_error(&self) -> Option<&str> {
        non_empty(&self.error)
    }
}

/// Body of `PUT /v1/services/{name}`.
///
/// The store rejects absent credential lists, so unset lists are sent as
/// empty arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServiceUpdate {
    pub credentials: Option<Vec<String>>,
    pub blind_credentials: Option<Vec<String>>,
    pub account: String,
    pub enabled: bool,
}

impl ServiceUpdate {
    /// Replace unset lists with empty ones.
    pub fn normalized(mut self) -> Self {
        self.credentials.get_or_insert_with(Vec::new);
        self.blind_credentials.get_or_insert_with(Vec::new);
        self
    }
}
