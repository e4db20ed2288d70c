//! Sliding-window rate limiting for validation attempts
//!
//! The store is a trait so a distributed deployment can back it with a shared
//! cache; the in-memory implementation ships for single-process use. Check
//! and record happen under one write guard, so two concurrent callers for the
//! same key cannot both pass the count check before either records.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// Rate-limit policy for validation attempts
#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicy {
    /// Maximum attempts within the trailing window
    pub max_attempts: usize,
    /// Window length
    pub window: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            window: Duration::from_secs(3600),
        }
    }
}

impl RateLimitPolicy {
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
        }
    }
}

/// Store deciding whether an attempt for a key is admitted
#[async_trait]
pub trait RateLimitStore: Send + Sync + Debug {
    /// Prune stale attempts, then admit-and-record or reject
    ///
    /// Returns `true` and records the attempt when the key is under its
    /// limit; returns `false` without recording otherwise.
    async fn check_and_record(&self, key_id: &str) -> bool;

    /// Drop all recorded attempts for a key
    async fn reset(&self, key_id: &str);
}

/// In-memory sliding-window implementation of [`RateLimitStore`]
#[derive(Debug)]
pub struct InMemoryRateLimiter {
    policy: RateLimitPolicy,
    attempts: Arc<RwLock<HashMap<String, Vec<Instant>>>>,
}

impl InMemoryRateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            attempts: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Check and record against an explicit instant; `now` is injected so
    /// tests can advance time without sleeping.
    pub async fn check_and_record_at(&self, key_id: &str, now: Instant) -> bool {
        let mut attempts = self.attempts.write().await;
        let window_start = now.checked_sub(self.policy.window);

        let key_attempts = attempts.entry(key_id.to_string()).or_default();
        match window_start {
            Some(cutoff) => key_attempts.retain(|t| *t > cutoff),
            // Process younger than the window: nothing can be stale yet
            None => {}
        }

        if key_attempts.len() < self.policy.max_attempts {
            key_attempts.push(now);
            true
        } else {
            false
        }
    }
}

impl Default for InMemoryRateLimiter {
    fn default() -> Self {
        Self::new(RateLimitPolicy::default())
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimiter {
    async fn check_and_record(&self, key_id: &str) -> bool {
        self.check_and_record_at(key_id, Instant::now()).await
    }

    async fn reset(&self, key_id: &str) {
        let mut attempts = self.attempts.write().await;
        attempts.remove(key_id);
    }
}
