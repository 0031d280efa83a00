use serde::{Deserialize, Serialize};
use std::fmt;

use crate::sampling::Bounds;

/// Decimals kept for the buffer fraction when building keys
const BUFFER_PRECISION: u32 = 4;

/// Round to `decimals` places, folding `-0.0` into `0.0`
pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Parameters of one sampling request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryParameters {
    /// Opaque data epoch identifier (e.g. "2020-01-15")
    pub date_key: String,

    /// Optional viewport restriction
    #[serde(default)]
    pub bounds: Option<Bounds>,

    /// Global result cap
    pub budget: usize,

    /// Fraction each side of `bounds` is pushed outwards before filtering
    #[serde(default)]
    pub buffer_percent: f64,
}

impl QueryParameters {
    /// Query over the whole pool
    pub fn global(date_key: impl Into<String>, budget: usize) -> Self {
        Self {
            date_key: date_key.into(),
            bounds: None,
            budget,
            buffer_percent: 0.0,
        }
    }

    /// Query restricted to a bounding box
    pub fn in_bounds(date_key: impl Into<String>, bounds: Bounds, buffer_percent: f64, budget: usize) -> Self {
        Self {
            date_key: date_key.into(),
            bounds: Some(bounds),
            budget,
            buffer_percent,
        }
    }

    /// Canonical form: bounds rounded to `precision` decimals, buffer
    /// sanitized and rounded, buffer dropped for global queries.
    ///
    /// The pipeline runs on the normalized form so that equal keys always
    /// map to equal results.
    pub fn normalized(&self, precision: u32) -> Self {
        let bounds = self.bounds.map(|b| b.rounded(precision));
        let buffer_percent = if bounds.is_some() && self.buffer_percent.is_finite() && self.buffer_percent > 0.0 {
            round_to(self.buffer_percent, BUFFER_PRECISION)
        } else {
            0.0
        };

        Self {
            date_key: self.date_key.clone(),
            bounds,
            budget: self.budget,
            buffer_percent,
        }
    }

    /// Deterministic cache key for these parameters
    pub fn cache_key(&self, precision: u32) -> CacheKey {
        CacheKey::from_normalized(&self.normalized(precision), precision)
    }
}

/// Cache key derived from normalized query parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    fn from_normalized(params: &QueryParameters, precision: u32) -> Self {
        let p = precision as usize;
        let scope = match &params.bounds {
            Some(b) => format!(
                "bbox:{:.p$},{:.p$},{:.p$},{:.p$}:buf{:.4}",
                b.min_lat,
                b.max_lat,
                b.min_long,
                b.max_long,
                params.buffer_percent,
                p = p
            ),
            None => "global".to_string(),
        };

        Self(format!("{}|{}|n{}", params.date_key, scope, params.budget))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
