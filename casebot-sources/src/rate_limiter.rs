//! Per-host request pacing
//!
//! Spaces requests to one host by a fixed minimum interval, even when the
//! callers run concurrently.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Enforces a minimum delay between consecutive requests.
///
/// Each caller reserves its time slot while holding the lock and waits
/// outside it, so concurrent callers get distinct, evenly spaced slots.
#[derive(Debug)]
pub struct RateLimiter {
    /// Next free slot
    next_available: Mutex<Option<Instant>>,
    min_interval: Duration,
    name: String,
}

impl RateLimiter {
    pub fn new(min_interval: Duration, name: &str) -> Self {
        Self {
            next_available: Mutex::new(None),
            min_interval,
            name: name.to_string(),
        }
    }

    /// Wait until this caller's slot comes up.
    pub async fn acquire(&self) {
        let slot = {
            let mut next = self.next_available.lock().await;
            let now = Instant::now();
            let slot = match *next {
                Some(at) if at > now => at,
                _ => now,
            };
            *next = Some(slot + self.min_interval);
            slot
        };

        let wait = slot.saturating_duration_since(Instant::now());
        if !wait.is_zero() {
            debug!(limiter = %self.name, wait_ms = wait.as_millis() as u64, "Pacing request");
            tokio::time::sleep_until(slot).await;
        }
    }
}
