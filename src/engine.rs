use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;

use crate::cache::{CacheLayer, CacheStats, MemoryCache, SampleCache};
use crate::clock::{Clock, SystemClock};
use crate::config::SamplerConfig;
use crate::core::{CityPayload, QueryParameters, Sample, SampleResponse};
use crate::error::{Result, SamplerError};
use crate::ranking::{Ranker, WeightRanker};
use crate::sampling::{sample_pool, Bounds};
use crate::store::CandidateStore;
use crate::viewport::{Viewport, ViewportPolicy};

/// Main sampling orchestrator: cache in front of fetch → filter → quota →
/// rank → select.
pub struct SamplingEngine<P = CityPayload>
where
    P: Clone + Send + Sync + 'static,
{
    store: Arc<dyn CandidateStore<P>>,
    cache: Arc<CacheLayer<Sample<P>>>,
    ranker: Arc<dyn Ranker<P>>,
    viewport: ViewportPolicy,
    config: SamplerConfig,
}

impl<P> SamplingEngine<P>
where
    P: Clone + Send + Sync + 'static,
{
    /// Create engine with an in-memory cache and the wall clock
    pub fn new(store: Arc<dyn CandidateStore<P>>, config: SamplerConfig) -> Result<Self> {
        Self::with_cache(
            store,
            Arc::new(MemoryCache::<Sample<P>>::new()),
            Arc::new(SystemClock),
            config,
        )
    }

    /// Create engine with an explicit cache backend and clock
    pub fn with_cache(
        store: Arc<dyn CandidateStore<P>>,
        cache: Arc<dyn SampleCache<Sample<P>>>,
        clock: Arc<dyn Clock>,
        config: SamplerConfig,
    ) -> Result<Self> {
        config.validate()?;

        tracing::info!(
            "✅ Sampling engine ready (store: {}, cache: {}, ttl: {}s)",
            store.name(),
            cache.name(),
            config.cache_ttl_secs
        );

        Ok(Self {
            store,
            cache: Arc::new(CacheLayer::new(cache, clock, config.cache_ttl())),
            ranker: Arc::new(WeightRanker::new()),
            viewport: ViewportPolicy::new(config.zoom_threshold),
            config,
        })
    }

    /// Replace the in-category ranker
    pub fn with_ranker(mut self, ranker: Arc<dyn Ranker<P>>) -> Self {
        self.ranker = ranker;
        self
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Sample the whole pool for `date_key`
    pub async fn sample_global(&self, date_key: &str, budget: usize) -> Result<SampleResponse<P>> {
        self.sample(&QueryParameters::global(date_key, budget)).await
    }

    /// Sample only candidates inside the buffered `bounds`
    pub async fn sample_in_bounds(
        &self,
        date_key: &str,
        bounds: Bounds,
        buffer_percent: f64,
        budget: usize,
    ) -> Result<SampleResponse<P>> {
        self.sample(&QueryParameters::in_bounds(date_key, bounds, buffer_percent, budget))
            .await
    }

    /// Sample for a map viewport using the configured zoom threshold,
    /// budget and buffer
    pub async fn sample_viewport(&self, date_key: &str, viewport: &Viewport) -> Result<SampleResponse<P>> {
        let params = self
            .viewport
            .query_for(date_key, viewport, self.config.budget, self.config.buffer_percent);
        self.sample(&params).await
    }

    /// Run a sampling query
    pub async fn sample(&self, params: &QueryParameters) -> Result<SampleResponse<P>> {
        let start = Instant::now();
        // rounding can turn a slightly inverted box into a valid one
        let trivially_empty = params.budget == 0 || params.bounds.map_or(false, |b| !b.is_valid());
        let params = params.normalized(self.config.bounds_precision);
        let key = params.cache_key(self.config.bounds_precision);

        if trivially_empty {
            tracing::debug!("Empty sample for {} (zero budget or invalid bounds)", key);
            return Ok(SampleResponse {
                sample: Arc::new(Sample::empty(0)),
                from_cache: false,
                cache_key: key.to_string(),
                latency_ms: start.elapsed().as_secs_f64() * 1000.0,
                ranking_method: self.ranker.name().to_string(),
            });
        }

        let lookup = self
            .cache
            .get_or_compute(key.as_str(), || self.compute(&params))
            .await?;

        let response = SampleResponse {
            sample: lookup.value.clone(),
            from_cache: lookup.from_cache(),
            cache_key: key.to_string(),
            latency_ms: start.elapsed().as_secs_f64() * 1000.0,
            ranking_method: self.ranker.name().to_string(),
        };

        tracing::info!("✅ {} → {} ({:.2}ms)", key, response.display(), response.latency_ms);
        Ok(response)
    }

    async fn compute(&self, params: &QueryParameters) -> Result<Sample<P>> {
        let timeout = self.config.fetch_timeout();
        let pool = match tokio::time::timeout(timeout, self.store.fetch_pool(&params.date_key)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(SamplerError::StoreTimeout {
                    date_key: params.date_key.clone(),
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
        };

        if pool.is_empty() {
            tracing::debug!("Store {} has no candidates for {}", self.store.name(), params.date_key);
        }

        Ok(sample_pool(&pool, params, &self.config.quota_table, self.ranker.as_ref()))
    }

    /// Get cache statistics
    pub async fn cache_stats(&self) -> Result<CacheStats> {
        self.cache.stats().await
    }

    /// Drop every cached sample
    pub async fn clear_cache(&self) -> Result<u64> {
        self.cache.clear().await
    }

    /// Remove expired samples now
    pub async fn sweep_cache(&self) -> Result<u64> {
        self.cache.sweep().await
    }

    /// Start the periodic expiry sweep at the configured interval
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        self.cache.spawn_sweeper(self.config.sweep_interval())
    }
}
