use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::core::Candidate;
use crate::error::Result;
use crate::store::CandidateStore;

/// Fixed in-memory pools keyed by date
pub struct MemoryStore<P> {
    pools: HashMap<String, Vec<Candidate<P>>>,
    fetches: AtomicUsize,
}

impl<P> MemoryStore<P> {
    pub fn new() -> Self {
        Self {
            pools: HashMap::new(),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Add a pool for `date_key`, replacing any previous one
    pub fn with_pool(mut self, date_key: impl Into<String>, pool: Vec<Candidate<P>>) -> Self {
        self.pools.insert(date_key.into(), pool);
        self
    }

    /// Number of `fetch_pool` calls served so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl<P> Default for MemoryStore<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<P: Clone + Send + Sync + 'static> CandidateStore<P> for MemoryStore<P> {
    async fn fetch_pool(&self, date_key: &str) -> Result<Vec<Candidate<P>>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.pools.get(date_key).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "memory"
    }

    async fn is_available(&self) -> bool {
        true
    }
}
