//! Username and token derivation.

use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::encryptor::{EncryptionContext, Encryptor};
use crate::error::Result;

/// Protocol version prefixed to every username.
pub const TOKEN_VERSION: u32 = 2;

/// Width of the validity window carried in each token.
pub const TOKEN_LIFETIME_MINUTES: i64 = 60;

/// UTC basic ISO-8601, e.g. `20180703T170301Z`.
const TIME_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// The plaintext sealed inside a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub not_before: String,
    pub not_after: String,
}

impl TokenPayload {
    /// Window starting at `now` and lasting [`TOKEN_LIFETIME_MINUTES`].
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        let end = now + Duration::minutes(TOKEN_LIFETIME_MINUTES);
        Self {
            not_before: now.format(TIME_FORMAT).to_string(),
            not_after: end.format(TIME_FORMAT).to_string(),
        }
    }
}

/// Derives the `X-Auth-From` username and a fresh `X-Auth-Token` per request.
///
/// Tokens are never cached; each call encrypts a new window.
#[derive(Clone)]
pub struct TokenGenerator {
    key_id: String,
    context: EncryptionContext,
    encryptor: Arc<dyn Encryptor>,
}

impl TokenGenerator {
    /// Create a generator for tokens sent by `from` (of kind `user_type`) to `to`.
    pub fn new(
        key_id: impl Into<String>,
        to: impl Into<String>,
        from: impl Into<String>,
        user_type: impl Into<String>,
        encryptor: Arc<dyn Encryptor>,
    ) -> Self {
        let mut context = EncryptionContext::new();
        context.insert("from".to_string(), from.into());
        context.insert("to".to_string(), to.into());
        context.insert("user_type".to_string(), user_type.into());

        Self {
            key_id: key_id.into(),
            context,
            encryptor,
        }
    }

    /// Key identifier tokens are encrypted under.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Encryption context sent with every token.
    pub fn context(&self) -> &EncryptionContext {
        &self.context
    }

    fn context_value(&self, key: &str) -> &str {
        self.context.get(key).map(String::as_str).unwrap_or_default()
    }

    /// `{version}/{user_type}/{from}`.
    pub fn username(&self) -> String {
        format!(
            "{}/{}/{}",
            TOKEN_VERSION,
            self.context_value("user_type"),
            self.context_value("from")
        )
    }

    /// A fresh base64 token valid from now.
    pub async fn token(&self) -> Result<String> {
        self.token_at(Utc::now()).await
    }

    /// A base64 token whose window starts at `now`.
    ///
    /// Encryption failures are returned as-is; retrying is the caller's call.
    pub async fn token_at(&self, now: DateTime<Utc>) -> Result<String> {
        let payload = TokenPayload::starting_at(now);
        let plaintext = serde_json::to_vec(&payload)?;

        let ciphertext = self
            .encryptor
            .encrypt(&self.key_id, &plaintext, &self.context)
            .await?;

        debug!(
            encryptor = self.encryptor.name(),
            not_after = %payload.not_after,
            "derived auth token"
        );
        Ok(base64::engine::general_purpose::STANDARD.encode(ciphertext))
    }
}

impl std::fmt::Debug for TokenGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGenerator")
            .field("key_id", &self.key_id)
            .field("context", &self.context)
            .field("encryptor", &self.encryptor.name())
            .finish()
    }
}
