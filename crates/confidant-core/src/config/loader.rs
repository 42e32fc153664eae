//! Configuration loading, environment overrides and validation.

use super::{Config, EncryptorKind, TransportKind};
use crate::env;
use crate::error::ConfigError;
use crate::paths;
use secrecy::{ExposeSecret, SecretString};
use std::fs;
use std::path::Path;
use tracing::debug;

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = paths::config_file()?;
        Self::load(&path)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        debug!(path = %path.display(), "loaded configuration");
        Self::parse(&content)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Serialize to JSON5 string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 has no serializer; plain JSON is valid JSON5.
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply `CONFIDANT_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(env::get_var);
    }

    /// Apply overrides using `lookup` in place of the process environment.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("CONFIDANT_URL") {
            self.store.url = url;
        }
        if let Some(key_id) = lookup("CONFIDANT_AUTH_KEY") {
            self.auth.key_id = key_id;
        }
        if let Some(from) = lookup("CONFIDANT_FROM") {
            self.auth.from = from;
        }
        if let Some(to) = lookup("CONFIDANT_TO") {
            self.auth.to = to;
        }
        if let Some(user_type) = lookup("CONFIDANT_USER_TYPE") {
            self.auth.user_type = user_type;
        }
        if let Some(region) = lookup("CONFIDANT_REGION") {
            self.auth.region = Some(region);
        }
        if let Some(socket) = lookup("CONFIDANT_UNIX_SOCKET") {
            self.store.transport.kind = TransportKind::Unix;
            self.store.transport.socket_path = Some(socket);
        }
        if let Some(key) = lookup("CONFIDANT_LOCAL_KEY") {
            self.auth.local_key = Some(SecretString::new(key));
        }
    }

    /// Socket path with `$VAR` references expanded, if one is configured.
    pub fn socket_path(&self) -> Option<String> {
        self.store
            .transport
            .socket_path
            .as_deref()
            .map(env::expand_vars)
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.store.url.is_empty() {
            errors.push("store.url is required".to_string());
        } else if url::Url::parse(&self.store.url).is_err() {
            errors.push(format!("store.url '{}' is not a valid URL", self.store.url));
        }

        if self.store.transport.kind == TransportKind::Unix
            && self
                .store
                .transport
                .socket_path
                .as_deref()
                .map_or(true, str::is_empty)
        {
            errors.push("unix transport requires store.transport.socket_path".to_string());
        }

        if self.auth.from.is_empty() {
            errors.push("auth.from is required".to_string());
        }
        if self.auth.to.is_empty() {
            errors.push("auth.to is required".to_string());
        }
        if self.auth.user_type.is_empty() {
            errors.push("auth.user_type must not be empty".to_string());
        }

        match self.auth.encryptor {
            EncryptorKind::Kms => {
                if self.auth.key_id.is_empty() {
                    errors.push("auth.key_id is required for the kms encryptor".to_string());
                }
            }
            EncryptorKind::Local => match &self.auth.local_key {
                None => errors.push("auth.local_key is required for the local encryptor".to_string()),
                Some(key) => {
                    let key = key.expose_secret().trim();
                    if key.len() != 64 || !key.chars().all(|c| c.is_ascii_hexdigit()) {
                        errors.push("auth.local_key must be 64 hex characters".to_string());
                    }
                }
            },
        }

        if self.grants.max_attempts == 0 {
            errors.push("grants.max_attempts must be at least 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }
}
