use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::core::Candidate;
use crate::error::{Result, SamplerError};

/// One row of the quota table.
///
/// `above: Some(n)` matches when the category count is strictly greater than
/// `n`; `above: None` is the fallback row and must come last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaBracket {
    #[serde(default)]
    pub above: Option<usize>,
    pub quota: usize,
}

impl QuotaBracket {
    pub fn above(threshold: usize, quota: usize) -> Self {
        Self {
            above: Some(threshold),
            quota,
        }
    }

    pub fn fallback(quota: usize) -> Self {
        Self { above: None, quota }
    }

    fn matches(&self, category_count: usize) -> bool {
        self.above.map_or(true, |threshold| category_count > threshold)
    }
}

/// Ordered threshold table mapping category count to a per-category cap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuotaTable(Vec<QuotaBracket>);

impl Default for QuotaTable {
    fn default() -> Self {
        Self(vec![
            QuotaBracket::above(30, 6),
            QuotaBracket::above(15, 11),
            QuotaBracket::fallback(21),
        ])
    }
}

impl QuotaTable {
    /// Build and validate a table
    pub fn new(brackets: Vec<QuotaBracket>) -> Result<Self> {
        let table = Self(brackets);
        table.validate()?;
        Ok(table)
    }

    /// Brackets must be non-empty, strictly decreasing, end in exactly one
    /// fallback row and carry positive quotas.
    pub fn validate(&self) -> Result<()> {
        let Some((last, rest)) = self.0.split_last() else {
            return Err(SamplerError::Config("quota table is empty".to_string()));
        };

        if last.above.is_some() {
            return Err(SamplerError::Config(
                "quota table must end with a fallback bracket (no `above`)".to_string(),
            ));
        }

        let mut previous: Option<usize> = None;
        for (i, bracket) in rest.iter().enumerate() {
            let Some(threshold) = bracket.above else {
                return Err(SamplerError::Config(format!(
                    "quota bracket {} has no `above`; only the last bracket may be a fallback",
                    i
                )));
            };
            if let Some(prev) = previous {
                if threshold >= prev {
                    return Err(SamplerError::Config(format!(
                        "quota thresholds must be strictly decreasing ({} follows {})",
                        threshold, prev
                    )));
                }
            }
            previous = Some(threshold);
        }

        if let Some(bracket) = self.0.iter().find(|b| b.quota == 0) {
            return Err(SamplerError::Config(format!(
                "quota bracket {:?} has a zero quota",
                bracket
            )));
        }

        Ok(())
    }

    /// Per-category cap for `category_count` distinct categories
    pub fn quota_for(&self, category_count: usize) -> usize {
        if category_count == 0 {
            return 0;
        }

        self.0
            .iter()
            .find(|b| b.matches(category_count))
            .map(|b| b.quota)
            .unwrap_or(0)
    }

    pub fn brackets(&self) -> &[QuotaBracket] {
        &self.0
    }
}

/// Distinct categories present in the pool
pub fn count_categories<P>(pool: &[&Candidate<P>]) -> usize {
    pool.iter()
        .map(|c| c.category.as_str())
        .collect::<HashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_boundaries() {
        let table = QuotaTable::default();

        assert_eq!(table.quota_for(0), 0);
        assert_eq!(table.quota_for(1), 21);
        assert_eq!(table.quota_for(15), 21);
        assert_eq!(table.quota_for(16), 11);
        assert_eq!(table.quota_for(30), 11);
        assert_eq!(table.quota_for(31), 6);
        assert_eq!(table.quota_for(150), 6);
    }

    #[test]
    fn test_table_validation() {
        assert!(QuotaTable::new(vec![]).is_err());
        assert!(QuotaTable::new(vec![QuotaBracket::above(10, 5)]).is_err());
        assert!(QuotaTable::new(vec![QuotaBracket::fallback(0)]).is_err());
        assert!(QuotaTable::new(vec![
            QuotaBracket::above(10, 5),
            QuotaBracket::above(20, 3),
            QuotaBracket::fallback(8),
        ])
        .is_err());
        assert!(QuotaTable::new(vec![
            QuotaBracket::fallback(8),
            QuotaBracket::fallback(9),
        ])
        .is_err());

        let single = QuotaTable::new(vec![QuotaBracket::fallback(4)]).unwrap();
        assert_eq!(single.quota_for(1000), 4);
    }

    #[test]
    fn test_table_from_yaml() {
        let yaml = "- { above: 50, quota: 3 }\n- { quota: 10 }\n";
        let table: QuotaTable = serde_yaml::from_str(yaml).unwrap();
        table.validate().unwrap();

        assert_eq!(table.quota_for(50), 10);
        assert_eq!(table.quota_for(51), 3);
    }

    #[test]
    fn test_count_categories() {
        let pool = vec![
            Candidate::new("1", "Peru", None, 0.0, 0.0, ()),
            Candidate::new("2", "Peru", None, 0.0, 0.0, ()),
            Candidate::new("3", "Chile", None, 0.0, 0.0, ()),
        ];
        let refs: Vec<&Candidate<()>> = pool.iter().collect();
        assert_eq!(count_categories(&refs), 2);
        assert_eq!(count_categories::<()>(&[]), 0);
    }
}
