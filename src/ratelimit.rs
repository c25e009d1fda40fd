//! Per-source rate limiting
//!
//! Enforces a minimum interval between consecutive calls keyed by source
//! name, so each provider in the cascade is throttled independently.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct RateLimiter {
    last_call: Arc<Mutex<HashMap<String, Instant>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the wait needed for `key` and reserve the next slot. The slot
    /// is reserved before sleeping so concurrent callers queue up rather than
    /// all passing at once.
    async fn reserve(&self, key: &str, min_interval: Duration) -> Option<Duration> {
        let mut last_call = self.last_call.lock().await;
        let now = Instant::now();

        let wait = match last_call.get(key) {
            Some(last) => {
                let elapsed = now.duration_since(*last);
                (elapsed < min_interval).then(|| min_interval - elapsed)
            }
            None => None,
        };

        last_call.insert(key.to_string(), now + wait.unwrap_or_default());
        wait
    }

    /// Wait until a call to `key` is allowed, enforcing `min_interval` since
    /// the previous call.
    pub async fn wait(&self, key: &str, min_interval: Duration) {
        if let Some(wait) = self.reserve(key, min_interval).await {
            debug!("Rate limiting {}: waiting {:?}", key, wait);
            sleep(wait).await;
        }
    }
}
