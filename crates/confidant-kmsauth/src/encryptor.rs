//! The encryption capability tokens are derived with.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::error::Result;

/// Encryption context bound to every ciphertext.
///
/// Ordered so that implementations which authenticate the context see the
/// same bytes for the same set of pairs.
pub type EncryptionContext = BTreeMap<String, String>;

/// A remote or local oracle that encrypts plaintext under a named key.
#[async_trait]
pub trait Encryptor: Send + Sync {
    /// Human-readable name of this encryptor.
    fn name(&self) -> &str;

    /// Encrypt `plaintext` under `key_id`, binding `context` to the result.
    async fn encrypt(
        &self,
        key_id: &str,
        plaintext: &[u8],
        context: &EncryptionContext,
    ) -> Result<Vec<u8>>;
}
