use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use crate::core::Candidate;
use crate::error::{Result, SamplerError};
use crate::store::CandidateStore;

/// Reads candidate pools from an existing SQLite database.
///
/// The table is populated by the import pipeline; this store only reads it:
/// ```sql
/// CREATE TABLE candidates (
///     id TEXT NOT NULL,
///     date_key TEXT NOT NULL,
///     category TEXT NOT NULL,
///     weight,            -- REAL, INTEGER, numeric TEXT or NULL
///     lat REAL,
///     long REAL,
///     payload TEXT       -- JSON
/// );
/// ```
pub struct SqliteStore<P> {
    conn: Arc<Mutex<Connection>>,
    _payload: PhantomData<fn() -> P>,
}

impl<P> SqliteStore<P> {
    /// Open the database at `db_path`
    pub fn open(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Ok(Self::from_connection(conn))
    }

    /// Use an already open connection
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            _payload: PhantomData,
        }
    }
}

/// Population arrives as REAL, INTEGER or TEXT depending on the import run
fn weight_from_value(value: Value) -> Option<f64> {
    match value {
        Value::Real(f) if !f.is_nan() => Some(f),
        Value::Integer(i) => Some(i as f64),
        Value::Text(s) => s.trim().parse::<f64>().ok().filter(|f| !f.is_nan()),
        _ => None,
    }
}

struct RawRow {
    id: String,
    category: String,
    weight: Option<f64>,
    lat: f64,
    long: f64,
    payload: Option<String>,
}

fn load_rows(conn: &Connection, date_key: &str) -> Result<Vec<RawRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, category, weight, lat, long, payload
         FROM candidates
         WHERE date_key = ?1 AND lat IS NOT NULL AND long IS NOT NULL
         ORDER BY id",
    )?;

    let rows = stmt
        .query_map(params![date_key], |row| {
            Ok(RawRow {
                id: row.get(0)?,
                category: row.get(1)?,
                weight: weight_from_value(row.get(2)?),
                lat: row.get(3)?,
                long: row.get(4)?,
                payload: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

#[async_trait]
impl<P> CandidateStore<P> for SqliteStore<P>
where
    P: DeserializeOwned + Send + 'static,
{
    async fn fetch_pool(&self, date_key: &str) -> Result<Vec<Candidate<P>>> {
        let conn = Arc::clone(&self.conn);
        let date_key = date_key.to_string();

        let rows = tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| SamplerError::Store {
                    store: "sqlite".to_string(),
                    message: "connection poisoned".to_string(),
                })?;
            load_rows(&conn, &date_key)
        })
        .await
        .map_err(|e| SamplerError::Store {
            store: "sqlite".to_string(),
            message: format!("fetch task failed: {}", e),
        })??;

        let mut pool = Vec::with_capacity(rows.len());
        for row in rows {
            let payload: P = serde_json::from_str(row.payload.as_deref().unwrap_or("null")).map_err(|e| {
                SamplerError::Store {
                    store: "sqlite".to_string(),
                    message: format!("bad payload for candidate {}: {}", row.id, e),
                }
            })?;
            pool.push(Candidate::new(row.id, row.category, row.weight, row.lat, row.long, payload));
        }

        tracing::debug!("Fetched {} candidates from sqlite", pool.len());
        Ok(pool)
    }

    fn name(&self) -> &str {
        "sqlite"
    }

    async fn is_available(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn
                .query_row("SELECT COUNT(*) FROM candidates LIMIT 1", [], |row| row.get::<_, i64>(0))
                .is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CityPayload;

    fn seeded() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE candidates (
                id TEXT NOT NULL,
                date_key TEXT NOT NULL,
                category TEXT NOT NULL,
                weight,
                lat REAL,
                long REAL,
                payload TEXT
            );
            INSERT INTO candidates VALUES
                ('2', '2020-01-15', 'Norway', 700000.0, 59.91, 10.75,
                 '{"kind":"temperature","city":"Oslo","avg_temperature":-2.3}'),
                ('1', '2020-01-15', 'Norway', '290000', 60.39, 5.32,
                 '{"kind":"temperature","city":"Bergen"}'),
                ('3', '2020-01-15', 'Norway', NULL, 69.65, 18.96,
                 '{"kind":"temperature","city":"Tromso"}'),
                ('4', '2020-01-15', 'Norway', 50000, NULL, NULL,
                 '{"kind":"temperature","city":"Nowhere"}'),
                ('5', '2020-02-15', 'Norway', 700000.0, 59.91, 10.75,
                 '{"kind":"sunshine","city":"Oslo","monthly_hours":[40.0]}');
            "#,
        )
        .unwrap();
        conn
    }

    #[tokio::test]
    async fn test_fetch_pool_for_date() {
        let store: SqliteStore<CityPayload> = SqliteStore::from_connection(seeded());

        let pool = store.fetch_pool("2020-01-15").await.unwrap();

        let ids: Vec<&str> = pool.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(pool[0].weight, Some(290_000.0));
        assert_eq!(pool[1].payload.city(), "Oslo");
        assert_eq!(pool[2].weight, None);
    }

    #[tokio::test]
    async fn test_unknown_date_is_empty() {
        let store: SqliteStore<CityPayload> = SqliteStore::from_connection(seeded());
        assert!(store.fetch_pool("1990-01-01").await.unwrap().is_empty());
        assert!(store.is_available().await);
    }

    #[tokio::test]
    async fn test_bad_payload_is_store_error() {
        let conn = seeded();
        conn.execute(
            "INSERT INTO candidates VALUES ('9', '2020-03-15', 'Chad', 1.0, 12.1, 15.0, '{oops')",
            [],
        )
        .unwrap();
        let store: SqliteStore<CityPayload> = SqliteStore::from_connection(conn);

        let err = store.fetch_pool("2020-03-15").await.unwrap_err();
        assert!(matches!(err, SamplerError::Store { .. }));
    }

    #[tokio::test]
    async fn test_missing_table_is_unavailable() {
        let store: SqliteStore<CityPayload> =
            SqliteStore::from_connection(Connection::open_in_memory().unwrap());
        assert!(!store.is_available().await);
        assert!(store.fetch_pool("2020-01-15").await.is_err());
    }
}
