//! The sampling pipeline: bounds filter, quota, ranking, selection.
//!
//! Every stage is a pure function of its inputs; state lives in the cache.

pub mod bounds;
pub mod quota;
pub mod selector;

use crate::core::{Candidate, QueryParameters, Sample};
use crate::ranking::Ranker;

pub use bounds::{filter_pool, Bounds};
pub use quota::{count_categories, QuotaBracket, QuotaTable};
pub use selector::select;

/// Run the full pipeline over a fetched pool.
///
/// `params` should already be normalized.
pub fn sample_pool<P: Clone>(
    pool: &[Candidate<P>],
    params: &QueryParameters,
    quota_table: &QuotaTable,
    ranker: &dyn Ranker<P>,
) -> Sample<P> {
    let filtered = filter_pool(pool, params.bounds.as_ref(), params.buffer_percent);
    let category_count = count_categories(&filtered);
    let quota = quota_table.quota_for(category_count);

    tracing::debug!(
        "Pool {} → {} after bounds, {} categories, quota {}",
        pool.len(),
        filtered.len(),
        category_count,
        quota
    );

    let filtered_size = filtered.len();
    let ranked = ranker.rank(&filtered);
    let candidates = select(ranked, quota, params.budget);

    Sample {
        candidates,
        category_count,
        quota,
        pool_size: pool.len(),
        filtered_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::WeightRanker;
    use std::collections::HashMap;

    fn world(categories: usize, per_category: usize) -> Vec<Candidate<()>> {
        let mut pool = Vec::new();
        for c in 0..categories {
            for i in 0..per_category {
                let lat = -60.0 + c as f64 * 0.8;
                let long = -170.0 + (i as f64 * 2.0);
                let weight = if i % 3 == 2 { None } else { Some((1000 - i) as f64) };
                pool.push(Candidate::new(
                    format!("{:03}-{:03}", c, i),
                    format!("country-{:03}", c),
                    weight,
                    lat,
                    long,
                    (),
                ));
            }
        }
        pool
    }

    fn per_category(sample: &Sample<()>) -> HashMap<&str, usize> {
        let mut counts = HashMap::new();
        for c in &sample.candidates {
            *counts.entry(c.category.as_str()).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_many_categories_use_tight_quota() {
        let pool = world(150, 10);
        let params = QueryParameters::global("d", 300);

        let sample = sample_pool(&pool, &params, &QuotaTable::default(), &WeightRanker::new());

        assert_eq!(sample.category_count, 150);
        assert_eq!(sample.quota, 6);
        assert!(sample.len() <= 300);
        assert!(per_category(&sample).values().all(|&n| n <= 6));
        // every country keeps its representative
        assert_eq!(per_category(&sample).len(), 150);
    }

    #[test]
    fn test_quota_counts_filtered_pool() {
        let pool = world(150, 30);
        // latitude is -60 + 0.8 * category index, so this box keeps countries 0..=4
        let bounds = Bounds::new(-60.0, -56.5, -180.0, 180.0);
        let params = QueryParameters::in_bounds("d", bounds, 0.0, 500);

        let sample = sample_pool(&pool, &params, &QuotaTable::default(), &WeightRanker::new());

        assert_eq!(sample.category_count, 5);
        assert_eq!(sample.quota, 21);
        assert_eq!(sample.len(), 5 * 21);
    }

    #[test]
    fn test_empty_pool() {
        let params = QueryParameters::global("d", 10);
        let sample = sample_pool::<()>(&[], &params, &QuotaTable::default(), &WeightRanker::new());

        assert!(sample.is_empty());
        assert_eq!(sample.quota, 0);
    }

    #[test]
    fn test_deterministic_output() {
        let pool = world(40, 8);
        let params = QueryParameters::global("d", 100);
        let table = QuotaTable::default();
        let ranker = WeightRanker::new();

        let first = sample_pool(&pool, &params, &table, &ranker);
        let mut reversed = pool.clone();
        reversed.reverse();
        let second = sample_pool(&reversed, &params, &table, &ranker);

        assert_eq!(first.candidates, second.candidates);
    }
}
