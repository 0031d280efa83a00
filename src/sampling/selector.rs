use crate::core::Candidate;
use crate::ranking::RankedCandidate;

/// Keep candidates within quota, order breadth before depth, cap at budget.
///
/// Ordering is rank ascending, then weight descending (unknown last), then
/// id ascending. Truncation drops from the tail, so every category's best
/// candidate survives before any category gets a second slot.
pub fn select<P: Clone>(ranked: Vec<RankedCandidate<'_, P>>, quota: usize, budget: usize) -> Vec<Candidate<P>> {
    let mut kept: Vec<RankedCandidate<'_, P>> = ranked
        .into_iter()
        .filter(|r| r.rank <= quota)
        .collect();

    kept.sort_by(|a, b| {
        a.rank
            .cmp(&b.rank)
            .then_with(|| a.candidate.priority_cmp(b.candidate))
    });
    kept.truncate(budget);

    kept.into_iter().map(|r| r.candidate.clone()).collect()
}
