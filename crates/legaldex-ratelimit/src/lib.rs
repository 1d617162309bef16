// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]
//! Per-key token-bucket rate limiting for calls to external services
//! (classifier providers, object store, search engine) gated behind a
//! rate-limit key (§4.8).
//!
//! Each key has its own continuously-refilling bucket: `acquire` computes
//! the refill lazily from the elapsed time since the bucket was last
//! touched, so there is no background sweeper task. Waiters on the same key
//! are served FIFO.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use legaldex_core::ErrorKind;
use tokio::sync::Notify;
use tracing::{debug, warn};

/// Errors returned by [`RateLimiter::acquire`].
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    /// The caller's deadline elapsed before enough tokens became available.
    #[error("rate limit deadline exceeded for key '{key}'")]
    DeadlineExceeded {
        /// The rate-limit key the caller was waiting on.
        key: String,
    },
}

impl RateLimitError {
    /// Maps onto [`ErrorKind::RateLimited`] (§7).
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::RateLimited
    }
}

/// Capacity and refill rate for one rate-limit key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyConfig {
    /// Maximum burst capacity, in tokens.
    pub capacity: f64,
    /// Continuous refill rate, in tokens per second.
    pub refill_per_sec: f64,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            capacity: 10.0,
            refill_per_sec: 1.0,
        }
    }
}

/// One waiter's place in a key's FIFO queue.
struct Ticket {
    id: u64,
    notify: Arc<Notify>,
}

/// Per-key bucket state. Guarded by a plain [`std::sync::Mutex`] — every
/// critical section here is a handful of float/queue operations, never an
/// await, so a blocking mutex is appropriate and cheaper than an async one.
struct KeyState {
    config: KeyConfig,
    tokens: f64,
    last_refill: Instant,
    queue: VecDeque<Ticket>,
    next_ticket: u64,
}

impl KeyState {
    fn new(config: KeyConfig) -> Self {
        Self {
            tokens: config.capacity,
            config,
            last_refill: Instant::now(),
            queue: VecDeque::new(),
            next_ticket: 0,
        }
    }

    /// Apply continuous refill for the time elapsed since `last_refill`,
    /// capped at `capacity`.
    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        if elapsed > 0.0 {
            self.tokens = (self.tokens + elapsed * self.config.refill_per_sec).min(self.config.capacity);
            self.last_refill = now;
        }
    }
}

/// Maximum time spent polling between refill re-checks, bounding how stale
/// a waiter's view of the bucket can get.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A token-bucket rate limiter, keyed by an arbitrary string (typically an
/// external-provider name).
pub struct RateLimiter {
    default_config: KeyConfig,
    states: Mutex<HashMap<String, Arc<Mutex<KeyState>>>>,
}

impl RateLimiter {
    /// Build a limiter using `default_config` for any key without an
    /// explicit override (see [`RateLimiter::configure_key`]).
    #[must_use]
    pub fn new(default_config: KeyConfig) -> Self {
        Self {
            default_config,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Explicitly configure `key`'s capacity/refill, overriding the default.
    /// Has no effect on tokens already accumulated for a key seen before.
    pub fn configure_key(&self, key: &str, config: KeyConfig) {
        let mut states = self.states.lock().expect("rate limiter state mutex poisoned");
        states
            .entry(key.to_string())
            .and_modify(|state| state.lock().expect("key state mutex poisoned").config = config)
            .or_insert_with(|| Arc::new(Mutex::new(KeyState::new(config))));
    }

    fn state_for(&self, key: &str) -> Arc<Mutex<KeyState>> {
        let mut states = self.states.lock().expect("rate limiter state mutex poisoned");
        states
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(KeyState::new(self.default_config))))
            .clone()
    }

    /// Acquire `n` tokens from `key`'s bucket, blocking (asynchronously)
    /// until either enough tokens are available and this waiter is at the
    /// front of the FIFO queue, or `deadline` elapses.
    pub async fn acquire(&self, key: &str, n: f64, deadline: Instant) -> Result<(), RateLimitError> {
        let state = self.state_for(key);
        let notify = Arc::new(Notify::new());
        let ticket_id = {
            let mut guard = state.lock().expect("key state mutex poisoned");
            let id = guard.next_ticket;
            guard.next_ticket += 1;
            guard.queue.push_back(Ticket { id, notify: notify.clone() });
            id
        };

        loop {
            {
                let mut guard = state.lock().expect("key state mutex poisoned");
                guard.refill(Instant::now());
                let is_front = guard.queue.front().is_some_and(|t| t.id == ticket_id);
                if is_front && guard.tokens >= n {
                    guard.tokens -= n;
                    guard.queue.pop_front();
                    if let Some(next) = guard.queue.front() {
                        next.notify.notify_one();
                    }
                    debug!(target: "legaldex.ratelimit", key, n, "granted");
                    return Ok(());
                }
            }

            let now = Instant::now();
            if now >= deadline {
                let mut guard = state.lock().expect("key state mutex poisoned");
                guard.queue.retain(|t| t.id != ticket_id);
                if let Some(next) = guard.queue.front() {
                    next.notify.notify_one();
                }
                warn!(target: "legaldex.ratelimit", key, n, "deadline exceeded");
                return Err(RateLimitError::DeadlineExceeded { key: key.to_string() });
            }

            let remaining = deadline.saturating_duration_since(now);
            let wait = POLL_INTERVAL.min(remaining);
            tokio::select! {
                () = notify.notified() => {}
                () = tokio::time::sleep(wait) => {}
            }
        }
    }

    /// Current token count for `key`, without consuming any. Used for
    /// diagnostics/tests; does not apply a pending refill beyond what was
    /// last computed.
    #[must_use]
    pub fn tokens_for(&self, key: &str) -> f64 {
        let state = self.state_for(key);
        let mut guard = state.lock().expect("key state mutex poisoned");
        guard.refill(Instant::now());
        guard.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquire_succeeds_immediately_when_tokens_available() {
        let limiter = RateLimiter::new(KeyConfig { capacity: 5.0, refill_per_sec: 1.0 });
        let deadline = Instant::now() + Duration::from_secs(1);
        limiter.acquire("openai", 1.0, deadline).await.unwrap();
        assert!(limiter.tokens_for("openai") < 5.0);
    }

    #[tokio::test]
    async fn acquire_drains_bucket_then_blocks() {
        let limiter = RateLimiter::new(KeyConfig { capacity: 1.0, refill_per_sec: 1.0 });
        let deadline = Instant::now() + Duration::from_millis(50);
        limiter.acquire("k", 1.0, deadline).await.unwrap();
        let err = limiter.acquire("k", 1.0, deadline).await.unwrap_err();
        assert!(matches!(err, RateLimitError::DeadlineExceeded { .. }));
    }

    #[tokio::test]
    async fn acquire_succeeds_after_refill() {
        let limiter = RateLimiter::new(KeyConfig { capacity: 1.0, refill_per_sec: 20.0 });
        let deadline = Instant::now() + Duration::from_secs(1);
        limiter.acquire("k", 1.0, deadline).await.unwrap();
        // refill rate is 20/sec, so ~50ms suffices for 1 token.
        limiter.acquire("k", 1.0, deadline).await.unwrap();
    }

    #[tokio::test]
    async fn configure_key_overrides_default() {
        let limiter = RateLimiter::new(KeyConfig::default());
        limiter.configure_key("bulk", KeyConfig { capacity: 100.0, refill_per_sec: 50.0 });
        assert_eq!(limiter.tokens_for("bulk"), 100.0);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let limiter = RateLimiter::new(KeyConfig { capacity: 1.0, refill_per_sec: 0.01 });
        let deadline = Instant::now() + Duration::from_secs(1);
        limiter.acquire("a", 1.0, deadline).await.unwrap();
        // a second key must not be affected by draining "a"'s bucket.
        limiter.acquire("b", 1.0, deadline).await.unwrap();
    }

    #[tokio::test]
    async fn fifo_fairness_across_waiters() {
        let limiter = Arc::new(RateLimiter::new(KeyConfig { capacity: 0.0, refill_per_sec: 50.0 }));
        let order = Arc::new(Mutex::new(Vec::new()));
        let deadline = Instant::now() + Duration::from_secs(2);

        let mut handles = Vec::new();
        for i in 0..5 {
            let limiter = limiter.clone();
            let order = order.clone();
            // stagger ticket creation so enqueue order is deterministic.
            tokio::time::sleep(Duration::from_millis(2)).await;
            handles.push(tokio::spawn(async move {
                limiter.acquire("fair", 1.0, deadline).await.unwrap();
                order.lock().unwrap().push(i);
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        let got = order.lock().unwrap().clone();
        assert_eq!(got, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn deadline_exceeded_does_not_starve_other_waiters() {
        let limiter = Arc::new(RateLimiter::new(KeyConfig { capacity: 1.0, refill_per_sec: 0.001 }));
        let deadline_now = Instant::now();
        limiter.acquire("k", 1.0, deadline_now + Duration::from_secs(1)).await.unwrap();

        // This waiter will time out almost immediately.
        let short_deadline = Instant::now() + Duration::from_millis(10);
        let err = limiter.acquire("k", 1.0, short_deadline).await.unwrap_err();
        assert!(matches!(err, RateLimitError::DeadlineExceeded { .. }));

        // The queue should be clean afterwards — a fresh long-deadline
        // acquire for a different key proves the limiter is still healthy.
        limiter
            .acquire("k2", 1.0, Instant::now() + Duration::from_secs(1))
            .await
            .unwrap();
    }
}
