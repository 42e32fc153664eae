//! Authentication tokens for the Confidant store.
//!
//! Every request to the store carries two headers: a username naming the
//! caller, and a bearer token that is the base64 ciphertext of a short
//! validity window, encrypted under a shared key with an encryption context
//! describing who is talking to whom.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use confidant_kmsauth::{KmsEncryptor, TokenGenerator};
//!
//! let kms = KmsEncryptor::from_env(Some("us-east-1".into()), None).await;
//! let generator = TokenGenerator::new(
//!     "alias/authnz-production",
//!     "confidant-production",
//!     "deploy-bot",
//!     "user",
//!     Arc::new(kms),
//! );
//!
//! let username = generator.username(); // "2/user/deploy-bot"
//! let token = generator.token().await?;
//! ```

pub mod encryptor;
pub mod error;
#[cfg(feature = "kms")]
pub mod kms;
pub mod local;
pub mod token;

pub use encryptor::{EncryptionContext, Encryptor};
pub use error::{AuthError, Result};
#[cfg(feature = "kms")]
pub use kms::KmsEncryptor;
pub use local::LocalEncryptor;
pub use token::{TokenGenerator, TokenPayload, TOKEN_LIFETIME_MINUTES, TOKEN_VERSION};
