//! Process-local service cache.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::request::RequestExecutor;
use crate::types::{Service, ServiceResponse};

/// Last-fetched service snapshots, keyed by name.
///
/// The store is the source of truth. Reads may be answered from the cache,
/// but anything that computes a new credential set must call
/// [`ServiceDirectory::refresh`] under [`ServiceDirectory::lock_for_update`].
pub struct ServiceDirectory {
    executor: Arc<RequestExecutor>,
    services: RwLock<HashMap<String, Service>>,
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl ServiceDirectory {
    /// Create an empty directory.
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self {
            executor,
            services: RwLock::new(HashMap::new()),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Cached service, or fetch and cache it.
    pub async fn get(&self, name: &str) -> Result<Service> {
        if let Some(service) = self.cached(name) {
            debug!(service = name, "service cache hit");
            return Ok(service);
        }
        self.refresh(name).await
    }

    /// Fetch the service from the store and replace the cached entry.
    pub async fn refresh(&self, name: &str) -> Result<Service> {
        let reply: ServiceResponse = self
            .executor
            .get(&format!("/v1/services/{name}"))
            .await
            .map_err(|e| match e {
                ClientError::NotFound => ClientError::ServiceNotFound(name.to_string()),
                other => other,
            })?;

        let service = reply.into_service()?;
        self.put(name, service.clone());
        Ok(service)
    }

    /// Cached entry, without touching the store.
    pub fn cached(&self, name: &str) -> Option<Service> {
        self.services.read().get(name).cloned()
    }

    /// Overwrite the cached entry.
    pub fn put(&self, name: &str, service: Service) {
        self.services.write().insert(name.to_string(), service);
    }

    /// Drop the cached entry.
    pub fn invalidate(&self, name: &str) -> Option<Service> {
        self.services.write().remove(name)
    }

    pub fn len(&self) -> usize {
        self.services.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.read().is_empty()
    }

    /// Exclusive mutation access to `name` within this client.
    ///
    /// Held across fetch, reconcile and submit. Writers in other processes
    /// are not excluded.
    pub async fn lock_for_update(&self, name: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock();
            // Holders and waiters keep a clone; anything else is idle.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    pub(crate) fn tracked_locks(&self) -> usize {
        self.locks.lock().len()
    }
}
