pub mod candidate;
pub mod query;
pub mod sample_response;

pub use candidate::{Candidate, CityPayload, SunshineReading, TemperatureReading};
pub use query::{CacheKey, QueryParameters};
pub use sample_response::{Sample, SampleResponse};
