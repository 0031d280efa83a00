use std::collections::BTreeMap;

use crate::core::Candidate;
use crate::ranking::{RankedCandidate, Ranker};

/// Ranks candidates inside their category by weight.
///
/// Heavier first, unknown weight last, ties broken by id ascending, so an
/// unchanged pool always ranks the same way.
pub struct WeightRanker;

impl WeightRanker {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WeightRanker {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Ranker<P> for WeightRanker {
    fn rank<'a>(&self, pool: &[&'a Candidate<P>]) -> Vec<RankedCandidate<'a, P>> {
        let mut groups: BTreeMap<&str, Vec<&'a Candidate<P>>> = BTreeMap::new();
        for candidate in pool {
            groups.entry(candidate.category.as_str()).or_default().push(*candidate);
        }

        let mut ranked = Vec::with_capacity(pool.len());
        for mut members in groups.into_values() {
            members.sort_by(|a, b| a.priority_cmp(b));

            ranked.extend(
                members
                    .into_iter()
                    .enumerate()
                    .map(|(i, candidate)| RankedCandidate::new(candidate, i + 1)),
            );
        }

        ranked
    }

    fn name(&self) -> &str {
        "weight"
    }
}
