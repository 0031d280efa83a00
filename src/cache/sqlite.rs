use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::cache::{CacheEntry, SampleCache};
use crate::error::{Result, SamplerError};

/// SQLite-based sample cache, shared across process restarts.
///
/// Schema:
/// ```sql
/// CREATE TABLE sample_cache (
///     key TEXT PRIMARY KEY,
///     value TEXT NOT NULL,
///     created_at TEXT NOT NULL,
///     ttl_ms INTEGER NOT NULL,
///     expires_at_ms INTEGER NOT NULL
/// );
/// ```
pub struct SqliteCache<V> {
    conn: Arc<Mutex<Connection>>,
    _value: PhantomData<fn() -> V>,
}

impl<V> SqliteCache<V> {
    /// Open (or create) the cache table in the database at `db_path`
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::from_connection(conn)
    }

    /// Use an already open connection
    pub fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS sample_cache (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                created_at TEXT NOT NULL,
                ttl_ms INTEGER NOT NULL,
                expires_at_ms INTEGER NOT NULL
            )",
            [],
        )?;

        // Sweeps scan by expiry
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_sample_cache_expires ON sample_cache(expires_at_ms)",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            _value: PhantomData,
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| SamplerError::Cache("sqlite cache connection poisoned".to_string()))
    }
}

#[async_trait]
impl<V> SampleCache<V> for SqliteCache<V>
where
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<Option<CacheEntry<V>>> {
        let row = {
            let conn = self.conn()?;
            conn.query_row(
                "SELECT value, created_at, ttl_ms FROM sample_cache WHERE key = ?1",
                params![key],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, i64>(2)?)),
            )
            .optional()?
        };

        let Some((value_json, created_at, ttl_ms)) = row else {
            return Ok(None);
        };

        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| SamplerError::Cache(format!("bad created_at for '{}': {}", key, e)))?;
        let value: V = serde_json::from_str(&value_json)?;

        Ok(Some(CacheEntry::new(
            key,
            Arc::new(value),
            created_at,
            TimeDelta::milliseconds(ttl_ms),
        )))
    }

    async fn put(&self, entry: CacheEntry<V>) -> Result<()> {
        let value_json = serde_json::to_string(entry.value.as_ref())?;
        // expiry is stored in milliseconds; keep freshness on the same grid
        let entry = CacheEntry::new(
            entry.key,
            entry.value,
            entry.created_at.trunc_subsecs(3),
            TimeDelta::milliseconds(entry.ttl.num_milliseconds()),
        );
        let conn = self.conn()?;

        conn.execute(
            "INSERT OR REPLACE INTO sample_cache (key, value, created_at, ttl_ms, expires_at_ms)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.key,
                value_json,
                entry.created_at.to_rfc3339(),
                entry.ttl.num_milliseconds(),
                entry.expires_at().timestamp_millis(),
            ],
        )?;

        Ok(())
    }

    async fn expire(&self, key: &str, now: DateTime<Utc>) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM sample_cache WHERE key = ?1 AND expires_at_ms <= ?2",
            params![key, now.timestamp_millis()],
        )?;
        Ok(deleted > 0)
    }

    async fn sweep(&self, now: DateTime<Utc>) -> Result<u64> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM sample_cache WHERE expires_at_ms <= ?1",
            params![now.timestamp_millis()],
        )?;
        Ok(deleted as u64)
    }

    async fn clear(&self) -> Result<u64> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM sample_cache", [])?;
        Ok(deleted as u64)
    }

    async fn len(&self) -> Result<u64> {
        let conn = self.conn()?;
        let total: u64 = conn.query_row("SELECT COUNT(*) FROM sample_cache", [], |row| row.get(0))?;
        Ok(total)
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}
