//! # Vaycay Sampler
//!
//! Fair geographic sampling for map rendering:
//! - Optional bounding-box pre-filter with buffer
//! - Adaptive per-category quotas from a threshold table
//! - Breadth-before-depth selection under a global budget
//! - TTL cache with single-flight computation (memory or SQLite)
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vaycay_sampler::{CityPayload, SamplerConfig, SamplingEngine, store::SqliteStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(SqliteStore::<CityPayload>::open("vaycay.db")?);
//!     let engine = SamplingEngine::<CityPayload>::new(store, SamplerConfig::default())?;
//!
//!     let response = engine.sample_global("2020-01-15", 300).await?;
//!
//!     println!("Sampled {}", response.display());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod clock;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod ranking;
pub mod sampling;
pub mod store;
pub mod viewport;

// Re-export primary types
pub use cache::{CacheLayer, CacheStats, MemoryCache, SqliteCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SamplerConfig;
pub use core::{Candidate, CityPayload, QueryParameters, Sample, SampleResponse};
pub use engine::SamplingEngine;
pub use error::{Result, SamplerError};
pub use sampling::{Bounds, QuotaBracket, QuotaTable};
pub use viewport::{Viewport, ViewportPolicy};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
