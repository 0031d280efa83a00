use serde::{Deserialize, Serialize};

use crate::core::QueryParameters;
use crate::sampling::Bounds;

/// What the map currently shows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub bounds: Bounds,
    pub zoom: f64,
}

/// Decides between a bounds query and a global query for a viewport.
///
/// At or above `zoom_threshold` the viewport bounds are used; below it the
/// global pool is sampled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportPolicy {
    pub zoom_threshold: f64,
}

impl ViewportPolicy {
    pub fn new(zoom_threshold: f64) -> Self {
        Self { zoom_threshold }
    }

    pub fn should_use_bounds(&self, zoom: f64) -> bool {
        zoom >= self.zoom_threshold
    }

    /// Query parameters for `viewport`
    pub fn query_for(&self, date_key: &str, viewport: &Viewport, budget: usize, buffer_percent: f64) -> QueryParameters {
        if self.should_use_bounds(viewport.zoom) {
            QueryParameters::in_bounds(date_key, viewport.bounds, buffer_percent, budget)
        } else {
            QueryParameters::global(date_key, budget)
        }
    }
}
