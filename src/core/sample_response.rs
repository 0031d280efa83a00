use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::{Candidate, CityPayload};

/// Output of one pipeline run; this is what the cache stores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample<P = CityPayload> {
    /// Selected candidates, breadth before depth
    pub candidates: Vec<Candidate<P>>,

    /// Distinct categories in the filtered pool
    pub category_count: usize,

    /// Per-category cap that was applied
    pub quota: usize,

    /// Candidates returned by the store
    pub pool_size: usize,

    /// Candidates left after the bounds filter
    pub filtered_size: usize,
}

impl<P> Sample<P> {
    /// Sample with nothing selected
    pub fn empty(pool_size: usize) -> Self {
        Self {
            candidates: Vec::new(),
            category_count: 0,
            quota: 0,
            pool_size,
            filtered_size: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Sample plus request metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleResponse<P = CityPayload> {
    pub sample: Arc<Sample<P>>,

    /// Whether the sample came from the cache
    pub from_cache: bool,

    /// Key the sample is cached under
    pub cache_key: String,

    /// Request latency in milliseconds
    pub latency_ms: f64,

    /// Ranking method used
    pub ranking_method: String,
}

impl<P> SampleResponse<P> {
    /// Selected candidates in priority order
    pub fn candidates(&self) -> &[Candidate<P>] {
        &self.sample.candidates
    }

    /// Get display string for logging
    pub fn display(&self) -> String {
        format!(
            "{} items from {} categories (quota {}, pool {}/{}) [{}] {}",
            self.sample.len(),
            self.sample.category_count,
            self.sample.quota,
            self.sample.filtered_size,
            self.sample.pool_size,
            self.ranking_method,
            if self.from_cache { "cached" } else { "computed" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sample() {
        let sample: Sample<()> = Sample::empty(42);
        assert!(sample.is_empty());
        assert_eq!(sample.pool_size, 42);
        assert_eq!(sample.quota, 0);
    }

    #[test]
    fn test_response_display() {
        let sample = Sample {
            candidates: vec![Candidate::new("1", "Chile", Some(1.0), -33.4, -70.6, ())],
            category_count: 1,
            quota: 21,
            pool_size: 10,
            filtered_size: 3,
        };
        let response = SampleResponse {
            sample: Arc::new(sample),
            from_cache: true,
            cache_key: "k".to_string(),
            latency_ms: 0.4,
            ranking_method: "weight".to_string(),
        };

        assert_eq!(response.candidates().len(), 1);
        assert_eq!(
            response.display(),
            "1 items from 1 categories (quota 21, pool 3/10) [weight] cached"
        );
    }
}
