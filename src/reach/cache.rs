//! Memoization of complete reach computations.
//!
//! ## Design
//!
//! - Keys are the hex SHA-256 of `prefix + url`
//! - Each key owns a slot holding a `tokio::sync::OnceCell`, so concurrent
//!   lookups for the same uncached URL wait on a single computation
//! - Slots live in a DashMap for concurrent access from request handlers
//! - Entries expire after a fixed TTL and are evicted lazily; failed
//!   computations leave the slot empty so the next caller retries

use super::{ReachError, ReachResult};
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;

struct CachedReach {
    result: Arc<ReachResult>,
    expires_at: Instant,
}

#[derive(Default)]
struct CacheSlot {
    cell: OnceCell<CachedReach>,
}

impl CacheSlot {
    fn is_expired(&self, now: Instant) -> bool {
        self.cell
            .get()
            .is_some_and(|cached| cached.expires_at <= now)
    }
}

/// True when `slot` holds an expired result, or holds nothing and no caller is
/// working on it. The map's own reference counts as one holder.
fn is_stale(slot: &Arc<CacheSlot>, now: Instant) -> bool {
    slot.is_expired(now) || (!slot.cell.initialized() && Arc::strong_count(slot) == 1)
}

/// Statistics about cache contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReachCacheStats {
    /// Slots holding a computed, unexpired result.
    pub live_entries: usize,
    /// Slots with a computation in flight.
    pub pending_entries: usize,
}

/// TTL cache of reach results keyed by the original post URL.
pub struct ReachCache {
    prefix: String,
    ttl: Duration,
    slots: DashMap<String, Arc<CacheSlot>>,
}

impl ReachCache {
    pub fn new(prefix: impl Into<String>, ttl: Duration) -> Self {
        Self {
            prefix: prefix.into(),
            ttl,
            slots: DashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Hash of the namespace prefix followed by the URL.
    pub fn cache_key(&self, url: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.prefix.as_bytes());
        hasher.update(url.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Return the cached result for `url`, running `compute` on a miss.
    ///
    /// Concurrent callers for the same key share one `compute` run. Errors are
    /// returned to the caller that ran the computation and are not cached; the
    /// slot is released once no other caller is waiting on it. Every miss also
    /// sweeps stale slots.
    pub async fn get_or_compute<F, Fut>(
        &self,
        url: &str,
        compute: F,
    ) -> Result<Arc<ReachResult>, ReachError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ReachResult, ReachError>>,
    {
        let key = self.cache_key(url);
        let slot = self.slot(&key);
        let ttl = self.ttl;

        let outcome = slot
            .cell
            .get_or_try_init(|| async move {
                log::debug!("reach cache miss for {}", url);
                self.purge_expired();
                let result = compute().await?;
                Ok::<_, ReachError>(CachedReach {
                    result: Arc::new(result),
                    expires_at: Instant::now() + ttl,
                })
            })
            .await;

        match outcome {
            Ok(cached) => Ok(Arc::clone(&cached.result)),
            Err(err) => {
                self.release_failed(&key, &slot);
                Err(err)
            }
        }
    }

    /// Drop `slot` after a failed computation unless another caller still holds it.
    fn release_failed(&self, key: &str, slot: &Arc<CacheSlot>) {
        let released = self
            .slots
            .remove_if(key, |_, current| {
                // Map plus this caller; anyone else is retrying on the same slot.
                Arc::ptr_eq(current, slot)
                    && !current.cell.initialized()
                    && Arc::strong_count(current) == 2
            })
            .is_some();
        if released {
            log::debug!("released reach cache slot {} after failure", key);
        }
    }

    /// Cached result for `url` if present and unexpired.
    pub fn get(&self, url: &str) -> Option<Arc<ReachResult>> {
        let key = self.cache_key(url);
        let now = Instant::now();
        let slot = self.slots.get(&key)?;
        slot.cell
            .get()
            .filter(|cached| cached.expires_at > now)
            .map(|cached| Arc::clone(&cached.result))
    }

    /// Drop every expired slot and every empty slot nobody is computing.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.slots.len();
        self.slots.retain(|_, slot| !is_stale(slot, now));
        let purged = before.saturating_sub(self.slots.len());
        if purged > 0 {
            log::debug!("purged {} expired reach cache entries", purged);
        }
        purged
    }

    pub fn stats(&self) -> ReachCacheStats {
        let now = Instant::now();
        let mut stats = ReachCacheStats::default();
        for slot in self.slots.iter() {
            match slot.cell.get() {
                Some(cached) if cached.expires_at > now => stats.live_entries += 1,
                Some(_) => {}
                None if Arc::strong_count(slot.value()) > 1 => stats.pending_entries += 1,
                None => {}
            }
        }
        stats
    }

    fn slot(&self, key: &str) -> Arc<CacheSlot> {
        let now = Instant::now();
        if self
            .slots
            .remove_if(key, |_, slot| is_stale(slot, now))
            .is_some()
        {
            log::debug!("reach cache entry {} expired", key);
        }

        self.slots
            .entry(key.to_string())
            .or_default()
            .value()
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache(ttl: Duration) -> ReachCache {
        ReachCache::new("test::", ttl)
    }

    #[test]
    fn cache_key_is_namespaced_and_stable() {
        let a = ReachCache::new("a::", Duration::from_secs(1));
        let b = ReachCache::new("b::", Duration::from_secs(1));
        let url = "https://x.example/user/status/1";

        assert_eq!(a.cache_key(url), a.cache_key(url));
        assert_ne!(a.cache_key(url), b.cache_key(url));
        assert_eq!(a.cache_key(url).len(), 64);
    }

    #[tokio::test]
    async fn second_lookup_is_served_from_cache() {
        let cache = cache(Duration::from_secs(60));
        let runs = AtomicUsize::new(0);
        let url = "https://x.example/user/status/1";

        let first = cache
            .get_or_compute(url, || async {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok(ReachResult::new(url))
            })
            .await
            .unwrap();
        let second = cache
            .get_or_compute(url, || async {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok(ReachResult::new("other"))
            })
            .await
            .unwrap();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.get(url).map(|r| r.tweet_url().to_string()), Some(url.to_string()));
        assert_eq!(cache.stats().live_entries, 1);
    }

    #[tokio::test]
    async fn expired_entries_are_recomputed() {
        let cache = cache(Duration::ZERO);
        let runs = AtomicUsize::new(0);
        let url = "https://x.example/user/status/2";

        for _ in 0..2 {
            cache
                .get_or_compute(url, || async {
                    runs.fetch_add(1, Ordering::SeqCst);
                    Ok(ReachResult::new(url))
                })
                .await
                .unwrap();
        }

        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert!(cache.get(url).is_none());
        assert_eq!(cache.purge_expired(), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = cache(Duration::from_secs(60));
        let url = "https://x.example/user/status/3";

        let err = cache
            .get_or_compute(url, || async {
                Err(ReachError::Mapping(crate::mapping::MappingError::NotAnObject(
                    "null",
                )))
            })
            .await;
        assert!(err.is_err());
        assert_eq!(cache.stats(), ReachCacheStats::default());

        let ok = cache
            .get_or_compute(url, || async { Ok(ReachResult::new(url)) })
            .await;
        assert!(ok.is_ok());
        assert_eq!(cache.stats().live_entries, 1);
    }

    #[tokio::test]
    async fn concurrent_lookups_share_one_computation() {
        let cache = Arc::new(cache(Duration::from_secs(60)));
        let runs = Arc::new(AtomicUsize::new(0));
        let url = "https://x.example/user/status/4";

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let runs = Arc::clone(&runs);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_compute(url, || async {
                        runs.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(ReachResult::new(url))
                    })
                    .await
                    .unwrap()
            }));
        }

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(results.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[tokio::test]
    async fn failed_computations_leave_no_slots_behind() {
        let cache = cache(Duration::from_millis(1));

        for id in 0..100 {
            let url = format!("https://x.example/user/status/{id}");
            let result = cache
                .get_or_compute(&url, || async {
                    Err(ReachError::Mapping(crate::mapping::MappingError::NotAnObject(
                        "null",
                    )))
                })
                .await;
            assert!(result.is_err());
        }

        assert_eq!(cache.slots.len(), 0);
        assert_eq!(cache.purge_expired(), 0);
        assert_eq!(cache.stats(), ReachCacheStats::default());
    }

    #[test]
    fn purge_drops_abandoned_empty_slots() {
        let cache = cache(Duration::from_secs(60));
        cache
            .slots
            .insert("abandoned".to_string(), Arc::new(CacheSlot::default()));

        let held = cache.slot("in-flight");

        assert_eq!(cache.stats().pending_entries, 1);
        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.slots.contains_key("in-flight"));
        drop(held);
        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.slots.is_empty());
    }

    #[tokio::test]
    async fn misses_sweep_expired_entries() {
        let cache = cache(Duration::ZERO);

        for id in 0..3 {
            let url = format!("https://x.example/user/status/{id}");
            cache
                .get_or_compute(&url, || async { Ok(ReachResult::new("done")) })
                .await
                .unwrap();
        }

        // Each miss swept the previous, already-expired entry.
        assert_eq!(cache.slots.len(), 1);
    }
}
