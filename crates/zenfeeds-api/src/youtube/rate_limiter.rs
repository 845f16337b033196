//! Spacing of concurrent YouTube API requests.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Default spacing between request starts (~20 req/s).
pub(crate) const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(50);

/// Hands out request start times at least `min_interval` apart.
///
/// The API meters a daily quota, not a rate, so this only smooths the
/// burst of a feed fan-out. Each caller reserves the next free slot and
/// sleeps outside the lock, so concurrent channel fetches queue in
/// arrival order instead of serializing on the sleep.
#[derive(Debug)]
pub struct RequestGate {
    min_interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RequestGate {
    /// Creates a gate. A zero interval never waits.
    pub(crate) const fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_slot: Mutex::const_new(None),
        }
    }

    /// Reserves the next slot and returns its start time.
    async fn reserve(&self) -> Instant {
        let now = Instant::now();
        let mut next_slot = self.next_slot.lock().await;
        let slot = next_slot.map_or(now, |next| next.max(now));
        *next_slot = Some(slot.checked_add(self.min_interval).unwrap_or(slot));
        slot
    }

    /// Waits for this caller's turn.
    pub async fn wait(&self) {
        if self.min_interval.is_zero() {
            return;
        }
        let slot = self.reserve().await;
        tokio::time::sleep_until(slot).await;
    }
}
