use chrono::TimeDelta;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::cache::{CacheEntry, CacheStats, SampleCache};
use crate::clock::Clock;
use crate::error::Result;

/// How a lookup was served
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Fresh entry found
    Hit,
    /// Computed by this caller
    Miss,
    /// Computed by a concurrent caller for the same key
    Coalesced,
}

/// Value returned by [`CacheLayer::get_or_compute`]
#[derive(Debug)]
pub struct Lookup<V> {
    pub value: Arc<V>,
    pub status: CacheStatus,
}

impl<V> Lookup<V> {
    pub fn from_cache(&self) -> bool {
        self.status != CacheStatus::Miss
    }
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
    expired: AtomicU64,
    swept: AtomicU64,
    read_errors: AtomicU64,
}

/// TTL memoization in front of a [`SampleCache`] backend.
///
/// At most one computation runs per key; concurrent callers for the same
/// key wait for it and then read its result from the backend. Failed
/// computations store nothing.
pub struct CacheLayer<V: Send + Sync + 'static> {
    backend: Arc<dyn SampleCache<V>>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
    inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    counters: Counters,
}

impl<V: Send + Sync + 'static> CacheLayer<V> {
    pub fn new(backend: Arc<dyn SampleCache<V>>, clock: Arc<dyn Clock>, ttl: TimeDelta) -> Self {
        Self {
            backend,
            clock,
            ttl,
            inflight: Mutex::new(HashMap::new()),
            counters: Counters::default(),
        }
    }

    /// Serve `key` from the cache, or run `compute` and store its result
    pub async fn get_or_compute<F, Fut>(&self, key: &str, compute: F) -> Result<Lookup<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        if let Some(value) = self.lookup(key).await {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Cache hit for {}", key);
            return Ok(Lookup {
                value,
                status: CacheStatus::Hit,
            });
        }

        let slot = self.slot(key).await;
        let guard = slot.lock().await;

        let outcome = match self.lookup(key).await {
            Some(value) => {
                self.counters.coalesced.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Cache filled by concurrent request for {}", key);
                Ok(Lookup {
                    value,
                    status: CacheStatus::Coalesced,
                })
            }
            None => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Cache miss for {}", key);
                self.compute_and_store(key, compute).await
            }
        };

        drop(guard);
        self.release(key, slot).await;
        outcome
    }

    async fn compute_and_store<F, Fut>(&self, key: &str, compute: F) -> Result<Lookup<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        let value = match compute().await {
            Ok(value) => Arc::new(value),
            Err(e) => {
                tracing::warn!("⚠️ Computation for {} failed, nothing cached: {}", key, e);
                return Err(e);
            }
        };

        let entry = CacheEntry::new(key, Arc::clone(&value), self.clock.now(), self.ttl);
        if let Err(e) = self.backend.put(entry).await {
            tracing::warn!("Failed to save {} to cache: {}", key, e);
        }

        Ok(Lookup {
            value,
            status: CacheStatus::Miss,
        })
    }

    /// Fresh value for `key`, if any. Expired entries are removed, backend
    /// failures count as a miss.
    async fn lookup(&self, key: &str) -> Option<Arc<V>> {
        let now = self.clock.now();
        match self.backend.get(key).await {
            Ok(Some(entry)) if entry.is_fresh(now) => Some(entry.value),
            Ok(Some(_)) => {
                self.counters.expired.fetch_add(1, Ordering::Relaxed);
                if let Err(e) = self.backend.expire(key, now).await {
                    tracing::warn!("Failed to drop expired entry {}: {}", key, e);
                }
                None
            }
            Ok(None) => None,
            Err(e) => {
                self.counters.read_errors.fetch_add(1, Ordering::Relaxed);
                tracing::warn!("⚠️ Cache read for {} failed, recomputing: {}", key, e);
                None
            }
        }
    }

    async fn slot(&self, key: &str) -> Arc<Mutex<()>> {
        let mut inflight = self.inflight.lock().await;
        Arc::clone(
            inflight
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    async fn release(&self, key: &str, slot: Arc<Mutex<()>>) {
        let mut inflight = self.inflight.lock().await;
        // one reference in the map, one held here: nobody else is waiting
        let idle = Arc::strong_count(&slot) <= 2;
        drop(slot);
        if idle {
            inflight.remove(key);
        }
    }

    /// Remove every expired entry
    pub async fn sweep(&self) -> Result<u64> {
        let removed = self.backend.sweep(self.clock.now()).await?;
        self.counters.swept.fetch_add(removed, Ordering::Relaxed);

        // slots left behind by cancelled requests
        self.inflight
            .lock()
            .await
            .retain(|_, slot| Arc::strong_count(slot) > 1);

        if removed > 0 {
            tracing::info!("🧹 Swept {} expired entries from {} cache", removed, self.backend.name());
        }
        Ok(removed)
    }

    /// Drop every entry
    pub async fn clear(&self) -> Result<u64> {
        let removed = self.backend.clear().await?;
        tracing::info!("🧹 Cleared {} entries from {} cache", removed, self.backend.name());
        Ok(removed)
    }

    /// Get cache statistics
    pub async fn stats(&self) -> Result<CacheStats> {
        Ok(CacheStats {
            backend: self.backend.name().to_string(),
            entries: self.backend.len().await?,
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            coalesced: self.counters.coalesced.load(Ordering::Relaxed),
            expired: self.counters.expired.load(Ordering::Relaxed),
            swept: self.counters.swept.load(Ordering::Relaxed),
            read_errors: self.counters.read_errors.load(Ordering::Relaxed),
        })
    }

    /// Run [`CacheLayer::sweep`] every `interval` until the handle is aborted
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let layer = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = layer.sweep().await {
                    tracing::warn!("Cache sweep failed: {}", e);
                }
            }
        })
    }
}
