use anyhow::Result;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Duration;

/// Epoch milliseconds source used for stamping and expiry.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

pub fn wall_clock_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    pub value: T,
    pub fetched_at_ms: i64,
}

/// Single-slot, in-memory cache with a fixed time-to-live.
///
/// The slot lives behind one async mutex that is held for the whole
/// check-compute-store sequence of [`ResultCache::get_or_refresh`], so a burst
/// of requests hitting a stale slot recomputes once and the rest wait for
/// that result.
pub struct ResultCache<T> {
    slot: Mutex<Option<CacheEntry<T>>>,
    ttl: Duration,
    clock: Clock,
}

impl<T: Clone> ResultCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(wall_clock_ms))
    }

    pub fn with_clock(ttl: Duration, clock: Clock) -> Self {
        Self {
            slot: Mutex::new(None),
            ttl,
            clock,
        }
    }

    pub fn now_ms(&self) -> i64 {
        (self.clock)()
    }

    pub fn ttl_ms(&self) -> i64 {
        self.ttl.as_millis() as i64
    }

    pub async fn get(&self) -> Option<CacheEntry<T>> {
        self.slot.lock().await.clone()
    }

    pub async fn set(&self, entry: CacheEntry<T>) {
        *self.slot.lock().await = Some(entry);
    }

    pub async fn is_fresh(&self, now_ms: i64) -> bool {
        let slot = self.slot.lock().await;
        Self::fresh(slot.as_ref(), now_ms, self.ttl_ms())
    }

    fn fresh(entry: Option<&CacheEntry<T>>, now_ms: i64, ttl_ms: i64) -> bool {
        entry.is_some_and(|entry| now_ms - entry.fetched_at_ms < ttl_ms)
    }

    /// Returns the cached entry while it is fresh, otherwise runs `refresh`
    /// and stores its result. A failed refresh leaves the slot untouched.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Result<CacheEntry<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut slot = self.slot.lock().await;
        if Self::fresh(slot.as_ref(), self.now_ms(), self.ttl_ms()) {
            if let Some(entry) = slot.as_ref() {
                return Ok(entry.clone());
            }
        }

        let value = refresh().await?;
        let entry = CacheEntry {
            value,
            fetched_at_ms: self.now_ms(),
        };
        *slot = Some(entry.clone());
        Ok(entry)
    }
}
