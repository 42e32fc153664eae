//! KMS grant provisioning.
//!
//! The store creates grants asynchronously, so a `PUT /v1/grants/{name}`
//! often answers before both grants exist. [`GrantProvisioner::ensure`]
//! polls until the grants are complete, the store says they never will be,
//! or the attempt budget runs out. Nothing carries over between calls.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{ClientError, Result};
use crate::request::RequestExecutor;
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};
use crate::types::{Grants, GrantsResponse, StoreReply};

/// Store messages after which retrying cannot help.
///
/// Matched exactly against free text the store controls; if the store ever
/// rewords them, terminal failures surface as timeouts instead.
pub const TERMINAL_GRANT_ERRORS: [&str; 2] = [
    "id provided does not exist",
    "id provided is not a service",
];

/// Result of a single provisioning attempt.
#[derive(Debug)]
enum Attempt {
    Granted(Grants),
    Denied(String),
    Pending(String),
}

fn classify(result: Result<GrantsResponse>) -> Attempt {
    match result {
        Ok(reply) => {
            if let Some(error) = reply.embedded_error() {
                if TERMINAL_GRANT_ERRORS.contains(&error) {
                    return Attempt::Denied(error.to_string());
                }
            }
            if reply.grants.is_complete() {
                Attempt::Granted(reply.grants)
            } else {
                Attempt::Pending(format!(
                    "encrypt_grant={} decrypt_grant={} error={}",
                    reply.grants.encrypt_grant,
                    reply.grants.decrypt_grant,
                    reply.embedded_error().unwrap_or("none")
                ))
            }
        }
        // Every executor failure concerns one call, not the grants.
        Err(e) => Attempt::Pending(e.to_string()),
    }
}

fn grants_path(service: &str) -> String {
    format!("/v1/grants/{service}")
}

/// Reads and provisions encrypt/decrypt grants for services.
pub struct GrantProvisioner {
    executor: Arc<RequestExecutor>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl GrantProvisioner {
    /// Create a provisioner with the default policy and real sleeps.
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self {
            executor,
            policy: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replace the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the sleeper.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Current grants for `service`, fetched once.
    pub async fn get(&self, service: &str) -> Result<Grants> {
        let reply: GrantsResponse = self.executor.get(&grants_path(service)).await?;
        Ok(reply.check()?.grants)
    }

    /// Make sure `service` holds both grants, polling the store until it does.
    pub async fn ensure(&self, service: &str) -> Result<Grants> {
        let path = grants_path(service);
        let max_attempts = self.policy.max_attempts;

        for attempt in 1..=max_attempts {
            let result = self.executor.put::<GrantsResponse>(&path, None).await;

            match classify(result) {
                Attempt::Granted(grants) => {
                    debug!(service, attempt, "grants in place");
                    return Ok(grants);
                }
                Attempt::Denied(reason) => {
                    warn!(service, %reason, "grants can never be created");
                    return Err(ClientError::TerminalGrant {
                        service: service.to_string(),
                        reason,
                    });
                }
                Attempt::Pending(detail) => {
                    warn!(
                        service,
                        attempt,
                        max_attempts,
                        %detail,
                        "failed to create KMS grants, trying again"
                    );
                }
            }

            if attempt < max_attempts {
                self.sleeper.sleep(self.policy.interval).await;
            }
        }

        Err(ClientError::GrantTimeout {
            service: service.to_string(),
            attempts: max_attempts,
        })
    }
}
