//! Sampler configuration.
//!
//! Loaded once at startup from YAML; every field has a default so a partial
//! file only overrides what it names:
//!
//! ```yaml
//! quota_table:
//!   - { above: 30, quota: 6 }
//!   - { above: 15, quota: 11 }
//!   - { quota: 21 }
//! budget: 300
//! buffer_percent: 0.1
//! cache_ttl_secs: 3600
//! sweep_interval_secs: 300
//! fetch_timeout_ms: 5000
//! bounds_precision: 3
//! zoom_threshold: 5.0
//! ```

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, SamplerError};
use crate::sampling::QuotaTable;

/// Highest supported rounding precision for bounds in cache keys
const MAX_BOUNDS_PRECISION: u32 = 9;

/// Longest accepted cache TTL and sweep interval (100 years)
const MAX_PERIOD_SECS: u64 = 100 * 365 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Category count → per-category cap
    pub quota_table: QuotaTable,

    /// Default global result cap
    pub budget: usize,

    /// Default bounds expansion fraction
    pub buffer_percent: f64,

    /// Lifetime of a cached sample
    pub cache_ttl_secs: u64,

    /// Period of the background expiry sweep
    pub sweep_interval_secs: u64,

    /// Upper bound on one store fetch
    pub fetch_timeout_ms: u64,

    /// Decimals kept when normalizing bounds
    pub bounds_precision: u32,

    /// Zoom level at or above which viewport queries use bounds
    pub zoom_threshold: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            quota_table: QuotaTable::default(),
            budget: 300,
            buffer_percent: 0.1,
            cache_ttl_secs: 3600,
            sweep_interval_secs: 300,
            fetch_timeout_ms: 5000,
            bounds_precision: 3,
            zoom_threshold: 5.0,
        }
    }
}

impl SamplerConfig {
    /// Parse and validate YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&yaml)?;
        tracing::info!("📦 Loaded sampler config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.quota_table.validate()?;

        if self.budget == 0 {
            return Err(SamplerError::Config("budget must be positive".to_string()));
        }
        if !self.buffer_percent.is_finite() || self.buffer_percent < 0.0 {
            return Err(SamplerError::Config(format!(
                "buffer_percent must be a non-negative number, got {}",
                self.buffer_percent
            )));
        }
        if self.cache_ttl_secs == 0 || self.cache_ttl_secs > MAX_PERIOD_SECS {
            return Err(SamplerError::Config(format!(
                "cache_ttl_secs must be between 1 and {}, got {}",
                MAX_PERIOD_SECS, self.cache_ttl_secs
            )));
        }
        if self.sweep_interval_secs == 0 || self.sweep_interval_secs > MAX_PERIOD_SECS {
            return Err(SamplerError::Config(format!(
                "sweep_interval_secs must be between 1 and {}, got {}",
                MAX_PERIOD_SECS, self.sweep_interval_secs
            )));
        }
        if self.fetch_timeout_ms == 0 {
            return Err(SamplerError::Config("fetch_timeout_ms must be positive".to_string()));
        }
        if self.bounds_precision > MAX_BOUNDS_PRECISION {
            return Err(SamplerError::Config(format!(
                "bounds_precision must be at most {}",
                MAX_BOUNDS_PRECISION
            )));
        }
        if !self.zoom_threshold.is_finite() {
            return Err(SamplerError::Config("zoom_threshold must be finite".to_string()));
        }

        Ok(())
    }

    pub fn cache_ttl(&self) -> TimeDelta {
        TimeDelta::seconds(self.cache_ttl_secs as i64)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}
