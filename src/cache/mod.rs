pub mod layer;
pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;

use crate::error::Result;

pub use layer::{CacheLayer, CacheStatus, Lookup};
pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

/// Trait for sample cache backends
#[async_trait]
pub trait SampleCache<V: Send + Sync + 'static>: Send + Sync {
    /// Get entry by key, expired or not
    async fn get(&self, key: &str) -> Result<Option<CacheEntry<V>>>;

    /// Insert or replace an entry
    async fn put(&self, entry: CacheEntry<V>) -> Result<()>;

    /// Remove the entry for `key` only if it is expired at `now`
    async fn expire(&self, key: &str, now: DateTime<Utc>) -> Result<bool>;

    /// Remove every entry expired at `now`
    async fn sweep(&self, now: DateTime<Utc>) -> Result<u64>;

    /// Remove everything
    async fn clear(&self) -> Result<u64>;

    /// Number of stored entries, expired ones included
    async fn len(&self) -> Result<u64>;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Cached value with its lifetime
#[derive(Debug)]
pub struct CacheEntry<V> {
    pub key: String,
    pub value: Arc<V>,
    pub created_at: DateTime<Utc>,
    pub ttl: TimeDelta,
}

impl<V> CacheEntry<V> {
    pub fn new(key: impl Into<String>, value: Arc<V>, created_at: DateTime<Utc>, ttl: TimeDelta) -> Self {
        Self {
            key: key.into(),
            value,
            created_at,
            ttl,
        }
    }

    /// Servable iff `now - created_at < ttl`
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at < self.ttl
    }

    /// Saturates at the latest representable instant
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

impl<V> Clone for CacheEntry<V> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            value: Arc::clone(&self.value),
            created_at: self.created_at,
            ttl: self.ttl,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct CacheStats {
    pub backend: String,
    pub entries: u64,
    pub hits: u64,
    pub misses: u64,
    pub coalesced: u64,
    pub expired: u64,
    pub swept: u64,
    pub read_errors: u64,
}

impl CacheStats {
    /// Share of lookups served without computing, 0-100
    pub fn hit_rate(&self) -> f64 {
        let served = self.hits + self.coalesced;
        let total = served + self.misses;
        if total == 0 {
            0.0
        } else {
            served as f64 / total as f64 * 100.0
        }
    }
}
