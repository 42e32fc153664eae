//! In-process AES-256-GCM encryptor.
//!
//! Stands in for the key service when talking to a development store. Each
//! ciphertext carries a random salt and nonce:
//!
//! ```text
//! salt (32) || nonce (12) || aes-gcm ciphertext with tag
//! ```
//!
//! The per-message key is derived with HKDF-SHA256 from the master key and
//! the salt, using the key identifier as HKDF info. The encryption context is
//! authenticated as associated data, so decrypting under a different context
//! fails the same way KMS does.

use aes_gcm::aead::{Aead, Payload};
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use async_trait::async_trait;
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use tracing::debug;

use crate::encryptor::{EncryptionContext, Encryptor};
use crate::error::{AuthError, Result};

const NONCE_SIZE: usize = 12;
const SALT_SIZE: usize = 32;
const KEY_SIZE: usize = 32;

/// Encryptor holding a 256-bit master key in memory.
pub struct LocalEncryptor {
    master_key: Vec<u8>,
}

impl LocalEncryptor {
    /// Create an encryptor from raw key bytes. The key must be 32 bytes.
    pub fn new(master_key: Vec<u8>) -> Result<Self> {
        if master_key.len() != KEY_SIZE {
            return Err(AuthError::InvalidKey(format!(
                "master key must be exactly {KEY_SIZE} bytes, got {}",
                master_key.len()
            )));
        }
        Ok(Self { master_key })
    }

    /// Create an encryptor from a hex-encoded key.
    pub fn from_hex(hex_key: &str) -> Result<Self> {
        let key = hex::decode(hex_key.trim())
            .map_err(|e| AuthError::InvalidKey(format!("invalid hex: {e}")))?;
        Self::new(key)
    }

    /// Generate a new random master key.
    pub fn generate_key() -> Vec<u8> {
        let mut key = vec![0u8; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut key);
        key
    }

    /// Decrypt a blob produced by [`Encryptor::encrypt`] on this encryptor.
    pub fn decrypt(
        &self,
        key_id: &str,
        blob: &[u8],
        context: &EncryptionContext,
    ) -> Result<Vec<u8>> {
        if blob.len() < SALT_SIZE + NONCE_SIZE {
            return Err(AuthError::DecryptionFailed(
                "ciphertext too short".to_string(),
            ));
        }

        let (salt, rest) = blob.split_at(SALT_SIZE);
        let (nonce_bytes, ciphertext) = rest.split_at(NONCE_SIZE);
        let cipher = self.cipher(key_id, salt)?;
        let aad = associated_data(context)?;

        cipher
            .decrypt(
                Nonce::from_slice(nonce_bytes),
                Payload {
                    msg: ciphertext,
                    aad: &aad,
                },
            )
            .map_err(|e| AuthError::DecryptionFailed(e.to_string()))
    }

    fn cipher(&self, key_id: &str, salt: &[u8]) -> Result<Aes256Gcm> {
        let hk = Hkdf::<Sha256>::new(Some(salt), &self.master_key);
        let mut okm = [0u8; KEY_SIZE];
        hk.expand(key_id.as_bytes(), &mut okm)
            .map_err(|e| AuthError::EncryptionFailed(format!("key derivation: {e}")))?;
        Aes256Gcm::new_from_slice(&okm).map_err(|e| AuthError::InvalidKey(e.to_string()))
    }
}

/// Canonical bytes of the context; `BTreeMap` serializes in key order.
fn associated_data(context: &EncryptionContext) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(context)?)
}

#[async_trait]
impl Encryptor for LocalEncryptor {
    fn name(&self) -> &str {
        "local"
    }

    async fn encrypt(
        &self,
        key_id: &str,
        plaintext: &[u8],
        context: &EncryptionContext,
    ) -> Result<Vec<u8>> {
        let mut salt = [0u8; SALT_SIZE];
        rand::thread_rng().fill_bytes(&mut salt);
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);

        let cipher = self.cipher(key_id, &salt)?;
        let aad = associated_data(context)?;
        let ciphertext = cipher
            .encrypt(
                Nonce::from_slice(&nonce_bytes),
                Payload {
                    msg: plaintext,
                    aad: &aad,
                },
            )
            .map_err(|e| AuthError::EncryptionFailed(e.to_string()))?;

        let mut blob = Vec::with_capacity(SALT_SIZE + NONCE_SIZE + ciphertext.len());
        blob.extend_from_slice(&salt);
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);

        debug!(key_id, len = blob.len(), "encrypted locally");
        Ok(blob)
    }
}
