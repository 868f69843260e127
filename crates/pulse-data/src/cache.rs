//! Time-bounded read-through cache for price series.

use chrono::{DateTime, Utc};
use pulse_core::error::{CacheError, DataError};
use pulse_core::traits::MarketDataSource;
use pulse_core::types::{CacheKey, TimeSeries};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Default time-to-live for cached series.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// A stored series and when it was fetched.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub series: Arc<TimeSeries>,
    /// Monotonic fetch time, used for freshness
    pub fetched_at: Instant,
    /// Wall-clock fetch time, for display
    pub fetched_at_utc: DateTime<Utc>,
}

impl CacheEntry {
    /// Time since the series was fetched.
    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }

    /// Fresh iff `now - fetched_at < ttl`.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }
}

type Slot = Arc<AsyncMutex<Option<CacheEntry>>>;

/// Series cache keyed by (symbol, interval).
///
/// Each key has its own async lock. A caller that misses holds the key's
/// lock for the duration of the fetch, so concurrent callers for the same
/// key wait for that fetch and then see its entry as a hit. Keys never
/// block each other. The key map itself sits behind a synchronous mutex
/// that is only held to look up or remove a slot.
///
/// The cache is an ordinary value: build it once at startup and share it
/// by reference or `Arc`.
#[derive(Debug)]
pub struct SeriesCache {
    ttl: Duration,
    fetch_timeout: Option<Duration>,
    slots: Mutex<HashMap<CacheKey, Slot>>,
}

impl Default for SeriesCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl SeriesCache {
    /// Create a cache with the given TTL and no fetch timeout.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            fetch_timeout: None,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Fail fetches that take longer than `timeout` with a network error.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// Configured TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Configured fetch timeout.
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout
    }

    /// Get the series for `key`, fetching it when absent or stale.
    pub async fn get<F, Fut>(&self, key: &CacheKey, fetch: F) -> Result<Arc<TimeSeries>, CacheError>
    where
        F: FnOnce(CacheKey) -> Fut,
        Fut: Future<Output = Result<TimeSeries, DataError>>,
    {
        self.get_with_ttl(key, self.ttl, fetch).await
    }

    /// Read through to a market data source.
    pub async fn get_from(
        &self,
        key: &CacheKey,
        source: &dyn MarketDataSource,
    ) -> Result<Arc<TimeSeries>, CacheError> {
        self.get(key, |k| async move { source.fetch(&k.symbol, k.interval).await })
            .await
    }

    /// Same as [`SeriesCache::get`] with an explicit TTL.
    ///
    /// On a failed fetch nothing is written: a stale entry stays in place
    /// and the failure is returned as [`CacheError::RefreshFailed`]; with no
    /// prior entry it is [`CacheError::MissWithNoFallback`].
    pub async fn get_with_ttl<F, Fut>(
        &self,
        key: &CacheKey,
        ttl: Duration,
        fetch: F,
    ) -> Result<Arc<TimeSeries>, CacheError>
    where
        F: FnOnce(CacheKey) -> Fut,
        Fut: Future<Output = Result<TimeSeries, DataError>>,
    {
        let slot = self.slot(key);
        let mut entry = slot.lock().await;

        if let Some(current) = entry.as_ref() {
            if current.is_fresh(ttl) {
                debug!(key = %key, age_ms = current.age().as_millis() as u64, "cache hit");
                return Ok(Arc::clone(&current.series));
            }
        }

        let stale = entry.is_some();
        debug!(key = %key, stale, "cache miss, fetching");

        match self.run_fetch(key, fetch).await {
            Ok(series) => {
                let series = Arc::new(series);
                *entry = Some(CacheEntry {
                    key: key.clone(),
                    series: Arc::clone(&series),
                    fetched_at: Instant::now(),
                    fetched_at_utc: Utc::now(),
                });
                debug!(key = %key, rows = series.len(), "cache entry stored");
                Ok(series)
            }
            Err(source) => {
                warn!(key = %key, stale, kind = source.kind(), error = %source, "fetch failed");
                if stale {
                    return Err(CacheError::RefreshFailed {
                        key: key.to_string(),
                        source,
                    });
                }
                self.release_empty_slot(key, &slot);
                Err(CacheError::MissWithNoFallback {
                    key: key.to_string(),
                    source,
                })
            }
        }
    }

    /// Current entry for `key`, fresh or stale, without fetching.
    pub async fn peek(&self, key: &CacheKey) -> Option<CacheEntry> {
        let slot = self.existing_slot(key)?;
        let entry = slot.lock().await;
        entry.clone()
    }

    /// Whether `key` has an entry younger than the TTL.
    pub async fn is_fresh(&self, key: &CacheKey) -> bool {
        self.peek(key)
            .await
            .map(|e| e.is_fresh(self.ttl))
            .unwrap_or(false)
    }

    /// Remove the entry for `key` so the next `get` fetches.
    ///
    /// Returns true if the key was known to the cache.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        let removed = self.slots().remove(key).is_some();
        debug!(key = %key, removed, "cache entry invalidated");
        removed
    }

    /// Remove every entry.
    pub fn invalidate_all(&self) {
        let mut slots = self.slots();
        debug!(keys = slots.len(), "cache cleared");
        slots.clear();
    }

    /// Number of stored entries.
    ///
    /// Waits for in-flight fetches to finish. Keys whose fetch is in flight
    /// for the first time are not counted.
    pub async fn len(&self) -> usize {
        let slots: Vec<Slot> = self.slots().values().cloned().collect();
        let mut count = 0;
        for slot in slots {
            if slot.lock().await.is_some() {
                count += 1;
            }
        }
        count
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn run_fetch<F, Fut>(&self, key: &CacheKey, fetch: F) -> Result<TimeSeries, DataError>
    where
        F: FnOnce(CacheKey) -> Fut,
        Fut: Future<Output = Result<TimeSeries, DataError>>,
    {
        let fut = fetch(key.clone());
        match self.fetch_timeout {
            Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
                DataError::Network(format!("fetch for {} timed out after {:?}", key, limit))
            })?,
            None => fut.await,
        }
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self, key: &CacheKey) -> Slot {
        let mut slots = self.slots();
        Arc::clone(slots.entry(key.clone()).or_default())
    }

    fn existing_slot(&self, key: &CacheKey) -> Option<Slot> {
        self.slots().get(key).cloned()
    }

    /// Forget a slot that never held an entry, unless a waiter still holds it.
    ///
    /// Called with the slot's lock held, so the slot stays empty until it is
    /// removed.
    fn release_empty_slot(&self, key: &CacheKey, slot: &Slot) {
        let mut slots = self.slots();
        let ours = slots.get(key).is_some_and(|s| Arc::ptr_eq(s, slot));
        // One reference in the map, one held by the failing caller.
        if ours && Arc::strong_count(slot) == 2 {
            slots.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;
    use pulse_core::types::{Bar, Interval};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    const TTL: Duration = Duration::from_secs(300);

    fn key(symbol: &str) -> CacheKey {
        CacheKey::new(symbol, Interval::Hour1)
    }

    fn series(close: f64) -> TimeSeries {
        TimeSeries::new(
            "BTC-USD",
            Interval::Hour1,
            vec![Bar::new(1_000, close, close, close, close, 1.0)],
        )
    }

    fn fetcher(
        calls: &Arc<AtomicUsize>,
        result: Result<TimeSeries, DataError>,
    ) -> impl FnOnce(CacheKey) -> std::future::Ready<Result<TimeSeries, DataError>> {
        let calls = Arc::clone(calls);
        move |_key| {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(result)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_get_fetches_once() {
        let cache = SeriesCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));

        let got = cache.get(&key("BTC-USD"), fetcher(&calls, Ok(series(100.0)))).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(got.last().unwrap().close, 100.0);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_entry_is_hit_until_ttl_expires() {
        let cache = SeriesCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));
        let k = key("BTC-USD");

        cache.get(&k, fetcher(&calls, Ok(series(100.0)))).await.unwrap();
        tokio::time::advance(Duration::from_secs(299)).await;
        let hit = cache.get(&k, fetcher(&calls, Ok(series(200.0)))).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(hit.last().unwrap().close, 100.0);

        tokio::time::advance(Duration::from_secs(1)).await;
        let refreshed = cache.get(&k, fetcher(&calls, Ok(series(200.0)))).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(refreshed.last().unwrap().close, 200.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_forces_fetch() {
        let cache = SeriesCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));
        let k = key("ETH-USD");

        cache.get(&k, fetcher(&calls, Ok(series(1.0)))).await.unwrap();
        assert!(cache.is_fresh(&k).await);
        assert!(cache.invalidate(&k));
        assert!(cache.peek(&k).await.is_none());

        cache.get(&k, fetcher(&calls, Ok(series(2.0)))).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_all_clears_every_key() {
        let cache = SeriesCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));

        for symbol in ["BTC-USD", "ETH-USD", "SOL-USD"] {
            cache.get(&key(symbol), fetcher(&calls, Ok(series(1.0)))).await.unwrap();
        }
        assert_eq!(cache.len().await, 3);

        cache.invalidate_all();
        assert!(cache.is_empty().await);

        cache.get(&key("BTC-USD"), fetcher(&calls, Ok(series(1.0)))).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_keeps_stale_entry() {
        let cache = SeriesCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));
        let k = key("BTC-USD");

        cache.get(&k, fetcher(&calls, Ok(series(100.0)))).await.unwrap();
        let before = cache.peek(&k).await.unwrap();

        tokio::time::advance(TTL).await;
        let err = cache
            .get(&k, fetcher(&calls, Err(DataError::Network("reset".into()))))
            .await
            .unwrap_err();

        assert!(matches!(err, CacheError::RefreshFailed { .. }));
        assert_eq!(err.data_error(), &DataError::Network("reset".into()));

        let after = cache.peek(&k).await.unwrap();
        assert_eq!(after.series, before.series);
        assert_eq!(after.fetched_at, before.fetched_at);
        assert!(!after.is_fresh(TTL));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_failure_creates_no_entry() {
        let cache = SeriesCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));
        let k = key("NOPE-USD");
        let empty = DataError::EmptyResult {
            symbol: "NOPE-USD".into(),
            interval: Interval::Hour1,
        };

        let err = cache.get(&k, fetcher(&calls, Err(empty.clone()))).await.unwrap_err();

        assert_eq!(
            err,
            CacheError::MissWithNoFallback {
                key: k.to_string(),
                source: empty,
            }
        );
        assert!(cache.peek(&k).await.is_none());
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_series_is_cached_as_no_data() {
        let cache = SeriesCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));
        let k = key("SOL-USD");

        let first = cache
            .get(&k, fetcher(&calls, Ok(TimeSeries::empty("SOL-USD", Interval::Hour1))))
            .await
            .unwrap();
        let second = cache.get(&k, fetcher(&calls, Ok(series(1.0)))).await.unwrap();

        assert!(first.is_empty());
        assert!(second.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_misses_share_one_fetch() {
        let cache = SeriesCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));
        let k = key("BTC-USD");

        let requests = (0..8).map(|_| {
            let calls = Arc::clone(&calls);
            cache.get(&k, move |_| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(2)).await;
                Ok(series(42.0))
            })
        });
        let results = join_all(requests).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for result in results {
            assert_eq!(result.unwrap().last().unwrap().close, 42.0);
        }
    }

    #[tokio::test]
    async fn test_other_keys_do_not_wait_for_in_flight_fetch() {
        let cache = Arc::new(SeriesCache::new(TTL));
        let (release, gate) = oneshot::channel::<()>();
        let (started_tx, started_rx) = oneshot::channel::<()>();

        let slow = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                cache
                    .get(&key("BTC-USD"), move |_| async move {
                        let _ = started_tx.send(());
                        let _ = gate.await;
                        Ok(series(1.0))
                    })
                    .await
            })
        };
        started_rx.await.unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let fast = tokio::time::timeout(
            Duration::from_secs(5),
            cache.get(&key("ETH-USD"), fetcher(&calls, Ok(series(2.0)))),
        )
        .await
        .expect("other key blocked by in-flight fetch");
        assert!(fast.is_ok());

        release.send(()).unwrap();
        assert!(slow.await.unwrap().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_timeout_is_network_error() {
        let cache = SeriesCache::new(TTL).with_fetch_timeout(Duration::from_secs(5));
        let k = key("BTC-USD");

        let err = cache
            .get(&k, |_| async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(series(1.0))
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CacheError::MissWithNoFallback {
                source: DataError::Network(_),
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_first_fetch_then_retry_succeeds() {
        let cache = SeriesCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));
        let k = key("BTC-USD");

        let failed = cache
            .get(&k, fetcher(&calls, Err(DataError::Network("down".into()))))
            .await;
        assert!(failed.is_err());

        let ok = cache.get(&k, fetcher(&calls, Ok(series(5.0)))).await;
        assert!(ok.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiters_fetch_again_after_in_flight_failure() {
        let cache = SeriesCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));
        let k = key("BTC-USD");

        let requests = (0..4).map(|_| {
            let calls = Arc::clone(&calls);
            cache.get(&k, move |_| async move {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(1)).await;
                if call == 0 {
                    Err(DataError::Network("reset".into()))
                } else {
                    Ok(series(7.0))
                }
            })
        });
        let results = join_all(requests).await;

        // The first caller fails, the next waiter fetches, the rest hit.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let oks = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(oks, 3);
        assert!(matches!(
            results[0],
            Err(CacheError::MissWithNoFallback { .. })
        ));
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.slots().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_keys_leave_no_slots() {
        let cache = SeriesCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));

        for symbol in ["AAA-USD", "BBB-USD", "CCC-USD"] {
            let err = DataError::InvalidParameter(symbol.to_string());
            assert!(cache.get(&key(symbol), fetcher(&calls, Err(err))).await.is_err());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(cache.slots().is_empty());
    }
}
