//! Configuration schema definitions.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Main client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where the store lives and how to reach it.
    #[serde(default)]
    pub store: StoreConfig,

    /// Token derivation settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Grant provisioning retry settings.
    #[serde(default)]
    pub grants: GrantsConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Store endpoint configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the store (e.g. `https://confidant.example.com`).
    #[serde(default)]
    pub url: String,

    /// Transport used to reach the store.
    #[serde(default)]
    pub transport: TransportConfig,
}

/// Transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Transport kind.
    #[serde(default)]
    pub kind: TransportKind,

    /// Socket path for the `unix` transport. `$VAR` references are expanded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket_path: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kind: TransportKind::default(),
            socket_path: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

/// How requests reach the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Direct HTTP(S).
    #[default]
    Http,
    /// HTTP tunnelled through a local socket proxy.
    Unix,
}

/// Token derivation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Key identifier (ARN or alias) used to encrypt tokens.
    #[serde(default)]
    pub key_id: String,

    /// Identity of the caller.
    #[serde(default)]
    pub from: String,

    /// Identity of the store the token is addressed to.
    #[serde(default)]
    pub to: String,

    /// Caller type tag (`user` or `service`).
    #[serde(default = "default_user_type")]
    pub user_type: String,

    /// Region of the key service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Endpoint override for the key service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_endpoint: Option<String>,

    /// Which encryption capability derives tokens.
    #[serde(default)]
    pub encryptor: EncryptorKind,

    /// Hex-encoded 32-byte key for the `local` encryptor. Never written back.
    #[serde(default, skip_serializing)]
    pub local_key: Option<SecretString>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            key_id: String::new(),
            from: String::new(),
            to: String::new(),
            user_type: default_user_type(),
            region: None,
            kms_endpoint: None,
            encryptor: EncryptorKind::default(),
            local_key: None,
        }
    }
}

fn default_user_type() -> String {
    "user".to_string()
}

/// Encryption capability used for tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncryptorKind {
    /// AWS KMS.
    #[default]
    Kms,
    /// In-process AES-GCM, for development stores and tests.
    Local,
}

/// Grant provisioning configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantsConfig {
    /// Maximum provisioning attempts.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause between attempts, in seconds.
    #[serde(default = "default_retry_interval_secs")]
    pub retry_interval_secs: u64,
}

impl Default for GrantsConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_interval_secs: default_retry_interval_secs(),
        }
    }
}

fn default_max_attempts() -> u32 {
    10
}

fn default_retry_interval_secs() -> u64 {
    2
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
