pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use crate::core::Candidate;
use crate::error::Result;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Trait for candidate pool sources (database, fixtures, etc.)
#[async_trait]
pub trait CandidateStore<P: Send + 'static>: Send + Sync {
    /// Every candidate for `date_key`; an unknown date yields an empty pool
    async fn fetch_pool(&self, date_key: &str) -> Result<Vec<Candidate<P>>>;

    /// Get store name
    fn name(&self) -> &str;

    /// Check if store is reachable
    async fn is_available(&self) -> bool;
}
