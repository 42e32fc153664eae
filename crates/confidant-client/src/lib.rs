//! Authenticated client for the Confidant secret store.
//!
//! The client signs every request with a fresh token, provisions the
//! encrypt/decrypt grants a service needs before touching it, and
//! reconciles credential assignments against the store's current state.
//!
//! # Example
//!
//! ```rust,ignore
//! use confidant_client::ConfidantClient;
//! use confidant_core::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::load_default()?;
//!     config.apply_env();
//!
//!     let client = ConfidantClient::from_config(&config).await?;
//!     client.assign_credential("billing-api", "stripe-key").await?;
//!
//!     let service = client.get_service("billing-api").await?;
//!     println!("{} credentials", service.credentials.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod credentials;
pub mod directory;
pub mod error;
pub mod grants;
pub mod request;
pub mod retry;
pub mod transport;
pub mod types;

#[cfg(test)]
mod test_support;

pub use client::ConfidantClient;
pub use credentials::{ids_from_list, ids_from_mapping, reconcile, resolve_names};
pub use directory::ServiceDirectory;
pub use error::{ClientError, Result};
pub use grants::{GrantProvisioner, TERMINAL_GRANT_ERRORS};
pub use request::RequestExecutor;
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, Transport, TransportError};
#[cfg(unix)]
pub use transport::UnixSocketTransport;
pub use types::*;
