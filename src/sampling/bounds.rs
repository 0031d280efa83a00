use serde::{Deserialize, Serialize};

use crate::core::query::round_to;
use crate::core::Candidate;

pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;
pub const MIN_LONG: f64 = -180.0;
pub const MAX_LONG: f64 = 180.0;

/// Geographic bounding box in degrees, inclusive on every side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_long: f64,
    pub max_long: f64,
}

impl Bounds {
    pub fn new(min_lat: f64, max_lat: f64, min_long: f64, max_long: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_long,
            max_long,
        }
    }

    /// Finite and correctly ordered. Boxes crossing the antimeridian
    /// (`min_long > max_long`) are not valid.
    pub fn is_valid(&self) -> bool {
        [self.min_lat, self.max_lat, self.min_long, self.max_long]
            .iter()
            .all(|v| v.is_finite())
            && self.min_lat <= self.max_lat
            && self.min_long <= self.max_long
    }

    /// Push every side out by `buffer_percent` of its range, clamped to the
    /// valid coordinate domain.
    pub fn expand(&self, buffer_percent: f64) -> Self {
        let buffer = if buffer_percent.is_finite() && buffer_percent > 0.0 {
            buffer_percent
        } else {
            0.0
        };
        let lat_pad = (self.max_lat - self.min_lat) * buffer;
        let long_pad = (self.max_long - self.min_long) * buffer;

        Self {
            min_lat: (self.min_lat - lat_pad).clamp(MIN_LAT, MAX_LAT),
            max_lat: (self.max_lat + lat_pad).clamp(MIN_LAT, MAX_LAT),
            min_long: (self.min_long - long_pad).clamp(MIN_LONG, MAX_LONG),
            max_long: (self.max_long + long_pad).clamp(MIN_LONG, MAX_LONG),
        }
    }

    pub fn contains(&self, lat: f64, long: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && long >= self.min_long && long <= self.max_long
    }

    /// Every coordinate rounded to `decimals` places
    pub fn rounded(&self, decimals: u32) -> Self {
        Self {
            min_lat: round_to(self.min_lat, decimals),
            max_lat: round_to(self.max_lat, decimals),
            min_long: round_to(self.min_long, decimals),
            max_long: round_to(self.max_long, decimals),
        }
    }
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}] x [{}, {}]",
            self.min_lat, self.max_lat, self.min_long, self.max_long
        )
    }
}

/// Restrict the pool to the buffered box.
///
/// No bounds returns the whole pool; invalid bounds return nothing.
pub fn filter_pool<'a, P>(
    pool: &'a [Candidate<P>],
    bounds: Option<&Bounds>,
    buffer_percent: f64,
) -> Vec<&'a Candidate<P>> {
    let Some(bounds) = bounds else {
        return pool.iter().collect();
    };

    if !bounds.is_valid() {
        tracing::debug!("Rejecting invalid bounds {:?}", bounds);
        return Vec::new();
    }

    let window = bounds.expand(buffer_percent);
    pool.iter()
        .filter(|c| window.contains(c.lat, c.long))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(id: &str, lat: f64, long: f64) -> Candidate<()> {
        Candidate::new(id, "X", None, lat, long, ())
    }

    #[test]
    fn test_expand_by_range_fraction() {
        let b = Bounds::new(10.0, 20.0, 30.0, 50.0).expand(0.1);
        assert_eq!(b, Bounds::new(9.0, 21.0, 28.0, 52.0));
    }

    #[test]
    fn test_expand_clamps_to_domain() {
        let b = Bounds::new(-85.0, 85.0, -170.0, 170.0).expand(0.5);
        assert_eq!(b, Bounds::new(-90.0, 90.0, -180.0, 180.0));
    }

    #[test]
    fn test_negative_buffer_is_ignored() {
        let b = Bounds::new(10.0, 20.0, 30.0, 50.0);
        assert_eq!(b.expand(-0.3), b);
        assert_eq!(b.expand(f64::NAN), b);
    }

    #[test]
    fn test_boundaries_inclusive() {
        let b = Bounds::new(10.0, 20.0, 30.0, 50.0);
        assert!(b.contains(10.0, 30.0));
        assert!(b.contains(20.0, 50.0));
        assert!(!b.contains(20.0001, 40.0));
    }

    #[test]
    fn test_filter_without_bounds_keeps_everything() {
        let pool = vec![point("a", 0.0, 0.0), point("b", 80.0, 170.0)];
        assert_eq!(filter_pool(&pool, None, 0.1).len(), 2);
    }

    #[test]
    fn test_filter_uses_buffered_window() {
        let pool = vec![
            point("inside", 15.0, 40.0),
            point("buffer", 20.5, 40.0),
            point("outside", 25.0, 40.0),
        ];
        let bounds = Bounds::new(10.0, 20.0, 30.0, 50.0);

        let kept: Vec<&str> = filter_pool(&pool, Some(&bounds), 0.1)
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(kept, vec!["inside", "buffer"]);
    }

    #[test]
    fn test_inverted_bounds_yield_empty() {
        let pool = vec![point("a", 30.0, 0.0)];
        let inverted_lat = Bounds::new(50.0, 10.0, -10.0, 10.0);
        let inverted_long = Bounds::new(10.0, 50.0, 10.0, -10.0);

        assert!(filter_pool(&pool, Some(&inverted_lat), 0.0).is_empty());
        assert!(filter_pool(&pool, Some(&inverted_long), 0.0).is_empty());
    }

    #[test]
    fn test_non_finite_bounds_invalid() {
        assert!(!Bounds::new(f64::NAN, 1.0, 0.0, 1.0).is_valid());
        assert!(!Bounds::new(0.0, f64::INFINITY, 0.0, 1.0).is_valid());
    }
}
