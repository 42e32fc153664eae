//! The composed store client.

use confidant_core::config::{AuthConfig, Config, EncryptorKind, TransportKind};
use confidant_kmsauth::{Encryptor, LocalEncryptor, TokenGenerator};
use secrecy::ExposeSecret;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::credentials::{ids_from_list, ids_from_mapping, reconcile, resolve_names};
use crate::directory::ServiceDirectory;
use crate::error::{ClientError, Result};
use crate::grants::GrantProvisioner;
use crate::request::RequestExecutor;
use crate::retry::{RetryPolicy, Sleeper};
use crate::transport::{HttpTransport, Transport};
use crate::types::{
    Credential, CredentialsResponse, Grants, RolesResponse, Service, ServiceResponse,
    ServiceUpdate, ServicesResponse, StoreReply,
};

fn service_path(name: &str) -> String {
    format!("/v1/services/{name}")
}

/// Client for one store, acting as one caller identity.
///
/// Every mutating operation holds the service's update lock, re-fetches the
/// service, makes sure grants exist, submits, and caches what the store
/// returned.
pub struct ConfidantClient {
    executor: Arc<RequestExecutor>,
    grants: GrantProvisioner,
    directory: ServiceDirectory,
}

impl ConfidantClient {
    /// Create a client for the store at `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        tokens: TokenGenerator,
    ) -> Self {
        let executor = Arc::new(RequestExecutor::new(base_url, transport, tokens));
        Self {
            grants: GrantProvisioner::new(executor.clone()),
            directory: ServiceDirectory::new(executor.clone()),
            executor,
        }
    }

    /// Build a client from validated configuration.
    pub async fn from_config(config: &Config) -> Result<Self> {
        config
            .validate()
            .map_err(|e| ClientError::config(e.to_string()))?;

        let transport = transport_from_config(config)?;
        let encryptor = encryptor_from_config(&config.auth).await?;
        let tokens = TokenGenerator::new(
            config.auth.key_id.clone(),
            config.auth.to.clone(),
            config.auth.from.clone(),
            config.auth.user_type.clone(),
            encryptor,
        );

        info!(
            url = %config.store.url,
            transport = transport.name(),
            username = %tokens.username(),
            "confidant client ready"
        );

        Ok(Self::new(config.store.url.clone(), transport, tokens)
            .with_retry_policy(RetryPolicy::from(&config.grants)))
    }

    /// Replace the grant retry policy.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.grants = self.grants.with_policy(policy);
        self
    }

    /// Replace the pause used between grant attempts.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.grants = self.grants.with_sleeper(sleeper);
        self
    }

    pub fn directory(&self) -> &ServiceDirectory {
        &self.directory
    }

    /// Identity sent in `X-Auth-From`.
    pub fn username(&self) -> String {
        self.executor.tokens().username()
    }

    pub fn base_url(&self) -> &str {
        self.executor.base_url()
    }

    // Read-only operations

    /// Every credential the caller can see.
    pub async fn list_credentials(&self) -> Result<Vec<Credential>> {
        let reply: CredentialsResponse = self.executor.get("/v1/credentials").await?;
        Ok(reply.check()?.credentials)
    }

    /// Resolve credential names, failing with every name that does not exist.
    pub async fn find_credentials_by_name(&self, names: &[String]) -> Result<Vec<Credential>> {
        let available = self.list_credentials().await?;
        resolve_names(&available, names)
    }

    pub async fn list_services(&self) -> Result<Vec<Service>> {
        let reply: ServicesResponse = self.executor.get("/v1/services").await?;
        Ok(reply.services)
    }

    /// Service by name, answered from the cache when possible.
    pub async fn get_service(&self, name: &str) -> Result<Service> {
        self.directory.get(name).await
    }

    /// Identities the store permits services to be created for.
    pub async fn list_roles(&self) -> Result<Vec<String>> {
        let reply: RolesResponse = self.executor.get("/v1/roles").await?;
        Ok(reply.roles)
    }

    /// Fail with [`ClientError::InvalidRole`] unless `name` is a permitted role.
    pub async fn check_role(&self, name: &str) -> Result<()> {
        let roles = self.list_roles().await?;
        if roles.iter().any(|role| role == name) {
            Ok(())
        } else {
            Err(ClientError::InvalidRole(name.to_string()))
        }
    }

    pub async fn get_grants(&self, name: &str) -> Result<Grants> {
        self.grants.get(name).await
    }

    pub async fn ensure_grants(&self, name: &str) -> Result<Grants> {
        self.grants.ensure(name).await
    }

    // Mutations

    /// Create `name` with the named credentials.
    ///
    /// An existing service gets its grants ensured and is reported as
    /// [`ClientError::AlreadyExists`].
    pub async fn create_service(&self, name: &str, credential_names: &[String]) -> Result<Service> {
        let _guard = self.directory.lock_for_update(name).await;

        match self.directory.refresh(name).await {
            Ok(_) => {
                self.grants.ensure(name).await?;
                return Err(ClientError::AlreadyExists(name.to_string()));
            }
            Err(ClientError::ServiceNotFound(_)) => {}
            Err(e) => return Err(e),
        }

        self.check_role(name).await?;
        let credentials = self.find_credentials_by_name(credential_names).await?;

        info!(service = name, credentials = credentials.len(), "creating service");
        let created = self
            .submit(
                name,
                ServiceUpdate {
                    credentials: Some(ids_from_list(&credentials)),
                    enabled: true,
                    ..Default::default()
                },
            )
            .await?;
        self.finish(name, created).await
    }

    /// Replace the service's credentials with exactly the named ones.
    pub async fn set_service_credentials(
        &self,
        name: &str,
        credential_names: &[String],
    ) -> Result<Service> {
        let _guard = self.directory.lock_for_update(name).await;

        let service = self.directory.refresh(name).await?;
        self.grants.ensure(name).await?;
        let credentials = self.find_credentials_by_name(credential_names).await?;

        info!(service = name, credentials = credentials.len(), "setting service credentials");
        let updated = self
            .submit(
                name,
                ServiceUpdate {
                    credentials: Some(ids_from_list(&credentials)),
                    blind_credentials: Some(Vec::new()),
                    account: service.account,
                    enabled: service.enabled,
                },
            )
            .await?;
        self.finish(name, updated).await
    }

    /// Add and remove named credentials relative to the service's current set.
    pub async fn update_service_credentials(
        &self,
        name: &str,
        add: &[String],
        remove: &[String],
    ) -> Result<Service> {
        let _guard = self.directory.lock_for_update(name).await;

        let service = self.directory.refresh(name).await?;
        self.grants.ensure(name).await?;

        // Resolve both lists together so the error names every missing credential.
        let wanted = [add, remove].concat();
        let mut to_add = self.find_credentials_by_name(&wanted).await?;
        let to_remove = to_add.split_off(add.len());

        let merged = reconcile(&service.credentials, &to_add, &to_remove);
        info!(
            service = name,
            added = to_add.len(),
            removed = to_remove.len(),
            total = merged.len(),
            "updating service credentials"
        );

        let updated = self
            .submit(
                name,
                ServiceUpdate {
                    credentials: Some(ids_from_mapping(&merged)),
                    blind_credentials: Some(Vec::new()),
                    account: service.account,
                    enabled: service.enabled,
                },
            )
            .await?;
        self.finish(name, updated).await
    }

    /// Add one named credential to the service.
    pub async fn assign_credential(&self, service: &str, credential: &str) -> Result<Service> {
        self.update_service_credentials(service, &[credential.to_string()], &[])
            .await
    }

    /// Remove one named credential from the service.
    pub async fn unassign_credential(&self, service: &str, credential: &str) -> Result<Service> {
        self.update_service_credentials(service, &[], &[credential.to_string()])
            .await
    }

    /// Enable the service, keeping its current credentials.
    pub async fn enable_service(&self, name: &str) -> Result<Service> {
        let _guard = self.directory.lock_for_update(name).await;

        let service = self.directory.refresh(name).await?;
        self.grants.ensure(name).await?;

        info!(service = name, "enabling service");
        let updated = self
            .submit(
                name,
                ServiceUpdate {
                    credentials: Some(ids_from_list(&service.credentials)),
                    blind_credentials: Some(Vec::new()),
                    account: service.account,
                    enabled: true,
                },
            )
            .await?;
        self.finish(name, updated).await
    }

    /// Disable the service and strip all of its credentials.
    pub async fn disable_service(&self, name: &str) -> Result<Service> {
        let _guard = self.directory.lock_for_update(name).await;

        let service = self.directory.refresh(name).await?;

        info!(service = name, dropped = service.credentials.len(), "disabling service");
        let updated = self
            .submit(
                name,
                ServiceUpdate {
                    credentials: Some(Vec::new()),
                    blind_credentials: Some(Vec::new()),
                    account: service.account,
                    enabled: false,
                },
            )
            .await?;
        self.directory.put(name, updated.clone());
        Ok(updated)
    }

    async fn submit(&self, name: &str, update: ServiceUpdate) -> Result<Service> {
        let reply: ServiceResponse = self
            .executor
            .put(&service_path(name), Some(update))
            .await?;
        reply.into_service()
    }

    /// Ensure grants on a service the store already knew, then cache it.
    async fn finish(&self, name: &str, service: Service) -> Result<Service> {
        if service.revision != 0 {
            self.grants.ensure(name).await?;
        } else {
            debug!(service = name, "revision 0, skipping grants");
        }
        self.directory.put(name, service.clone());
        Ok(service)
    }
}

fn transport_from_config(config: &Config) -> Result<Arc<dyn Transport>> {
    let timeout = Duration::from_secs(config.store.transport.timeout_secs);
    match config.store.transport.kind {
        TransportKind::Http => Ok(Arc::new(HttpTransport::new(timeout)?)),
        TransportKind::Unix => unix_transport(config, timeout),
    }
}

#[cfg(unix)]
fn unix_transport(config: &Config, timeout: Duration) -> Result<Arc<dyn Transport>> {
    let path = config
        .socket_path()
        .ok_or_else(|| ClientError::config("unix transport requires a socket path"))?;
    Ok(Arc::new(crate::transport::UnixSocketTransport::new(
        path, timeout,
    )))
}

#[cfg(not(unix))]
fn unix_transport(_config: &Config, _timeout: Duration) -> Result<Arc<dyn Transport>> {
    Err(ClientError::config(
        "unix socket transport is not available on this platform",
    ))
}

async fn encryptor_from_config(auth: &AuthConfig) -> Result<Arc<dyn Encryptor>> {
    match auth.encryptor {
        EncryptorKind::Local => {
            let key = auth.local_key.as_ref().ok_or_else(|| {
                ClientError::config("auth.local_key is required for the local encryptor")
            })?;
            Ok(Arc::new(LocalEncryptor::from_hex(key.expose_secret())?))
        }
        EncryptorKind::Kms => kms_encryptor(auth).await,
    }
}

#[cfg(feature = "kms")]
async fn kms_encryptor(auth: &AuthConfig) -> Result<Arc<dyn Encryptor>> {
    let encryptor =
        confidant_kmsauth::KmsEncryptor::from_env(auth.region.clone(), auth.kms_endpoint.clone())
            .await;
    Ok(Arc::new(encryptor))
}

#[cfg(not(feature = "kms"))]
async fn kms_encryptor(_auth: &AuthConfig) -> Result<Arc<dyn Encryptor>> {
    Err(ClientError::config(
        "built without the kms feature; use the local encryptor",
    ))
}
