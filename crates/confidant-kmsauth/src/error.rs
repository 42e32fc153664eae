//! Error types for token derivation.

use thiserror::Error;

/// Errors that can occur while deriving a token.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Key service error: {0}")]
    KeyService(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result alias for token operations.
pub type Result<T> = std::result::Result<T, AuthError>;
