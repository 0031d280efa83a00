use thiserror::Error;

/// Main error type for the sampling engine
#[derive(Error, Debug)]
pub enum SamplerError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Candidate store errors
    #[error("Store '{store}' error: {message}")]
    Store { store: String, message: String },

    /// Candidate store did not answer in time
    #[error("Store fetch for '{date_key}' timed out after {timeout_ms}ms")]
    StoreTimeout { date_key: String, timeout_ms: u64 },

    /// Cache errors
    #[error("Cache error: {0}")]
    Cache(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl SamplerError {
    /// Whether a caller may retry the same request later.
    ///
    /// Store and database failures are transient from the sampler's point of
    /// view; nothing about them is cached.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SamplerError::Store { .. } | SamplerError::StoreTimeout { .. } | SamplerError::Database(_)
        )
    }
}

impl From<String> for SamplerError {
    fn from(s: String) -> Self {
        SamplerError::Other(s)
    }
}

impl From<&str> for SamplerError {
    fn from(s: &str) -> Self {
        SamplerError::Other(s.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, SamplerError>;
