//! AWS KMS encryptor.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_kms::primitives::Blob;
use aws_sdk_kms::Client;
use aws_types::region::Region;
use std::collections::HashMap;
use tracing::debug;

use crate::encryptor::{EncryptionContext, Encryptor};
use crate::error::{AuthError, Result};

/// Encrypts token payloads with the KMS `Encrypt` API.
#[derive(Clone)]
pub struct KmsEncryptor {
    client: Client,
}

impl KmsEncryptor {
    /// Wrap an existing KMS client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the ambient AWS configuration.
    ///
    /// `region` overrides the region from the environment; `endpoint`
    /// points the client at a KMS-compatible service.
    pub async fn from_env(region: Option<String>, endpoint: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let shared_config = loader.load().await;

        let mut builder = aws_sdk_kms::config::Builder::from(&shared_config);
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            builder = builder.endpoint_url(endpoint);
        }

        Self::new(Client::from_conf(builder.build()))
    }
}

#[async_trait]
impl Encryptor for KmsEncryptor {
    fn name(&self) -> &str {
        "kms"
    }

    async fn encrypt(
        &self,
        key_id: &str,
        plaintext: &[u8],
        context: &EncryptionContext,
    ) -> Result<Vec<u8>> {
        let context: HashMap<String, String> = context
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        debug!(key_id, "requesting kms encrypt");

        // No grant tokens: the caller's own key policy must allow Encrypt.
        let output = self
            .client
            .encrypt()
            .key_id(key_id)
            .set_encryption_context(Some(context))
            .plaintext(Blob::new(plaintext.to_vec()))
            .send()
            .await
            .map_err(|e| AuthError::KeyService(format!("kms encrypt: {e}")))?;

        output
            .ciphertext_blob()
            .map(|blob| blob.as_ref().to_vec())
            .ok_or_else(|| AuthError::KeyService("kms encrypt returned no ciphertext".into()))
    }
}
