pub mod weight;

use crate::core::Candidate;

pub use weight::WeightRanker;

/// Trait for in-category ranking implementations
pub trait Ranker<P>: Send + Sync {
    /// Assign every candidate a rank (1-based) within its category
    fn rank<'a>(&self, pool: &[&'a Candidate<P>]) -> Vec<RankedCandidate<'a, P>>;

    /// Get ranker name for logging
    fn name(&self) -> &str;
}

/// Candidate with its rank inside its category
#[derive(Debug)]
pub struct RankedCandidate<'a, P> {
    pub candidate: &'a Candidate<P>,
    pub rank: usize,
}

impl<'a, P> RankedCandidate<'a, P> {
    pub fn new(candidate: &'a Candidate<P>, rank: usize) -> Self {
        Self { candidate, rank }
    }
}

impl<P> Clone for RankedCandidate<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for RankedCandidate<'_, P> {}
