//! Fixed-interval retry policy and the pause it waits on.

use async_trait::async_trait;
use confidant_core::config::GrantsConfig;
use std::time::Duration;

/// How many times to attempt an operation and how long to pause in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval: Duration::from_secs(2),
        }
    }
}

impl From<&GrantsConfig> for RetryPolicy {
    fn from(config: &GrantsConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            interval: Duration::from_secs(config.retry_interval_secs),
        }
    }
}

/// Waits between attempts. Injected so tests need not wait in real time.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
