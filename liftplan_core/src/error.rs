//! Error types for the liftplan_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for liftplan_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Program definition or start-weight authoring defect; aborts the
    /// whole projection rather than produce partially-correct rows
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Catalog lookup or validation error
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Results journal error
    #[error("Journal error: {0}")]
    Journal(String),
}
