//! Error types for reflow passes

use thiserror::Error;

/// Reflow error type
#[derive(Debug, Error)]
pub enum ReflowError {
    /// The surface has not laid the content out yet (height <= 0)
    #[error("measurement not ready: content height resolved to {height}")]
    MeasurementNotReady { height: f32 },

    /// The content needs more pages than the configured maximum
    #[error("content height {height} needs more than {max_pages} pages")]
    ContentTooTall { height: f32, max_pages: usize },

    /// A structural path could not be parsed
    #[error("invalid structural path: {0}")]
    InvalidPath(String),

    /// The measurement surface failed
    #[error("measurement surface error: {0}")]
    Surface(String),

    /// Configuration rejected by validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Content tree or config could not be (de)serialized
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input could not be read
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReflowError {
    /// Whether the pass should simply be retried on the next trigger
    pub fn is_transient(&self) -> bool {
        matches!(self, ReflowError::MeasurementNotReady { .. })
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ReflowError>;
