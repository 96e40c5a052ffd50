//! Error types for the oncoscreen-serving crate.
//!
//! Every failure that can happen while screening one submission is a variant
//! of [`ScreeningError`]. User-facing copy is chosen at the presentation
//! boundary (see [`crate::page`] and [`crate::server`]), never here.

use thiserror::Error;

/// Result type alias for screening operations.
pub type ScreeningResult<T> = Result<T, ScreeningError>;

/// Errors that can occur while loading artifacts or screening a submission.
#[derive(Debug, Error)]
pub enum ScreeningError {
    /// The submission did not contain exactly the expected number of values.
    #[error("Expected exactly {expected} feature values, got {actual}")]
    InvalidFeatureCount {
        /// Number of values required
        expected: usize,
        /// Number of values supplied
        actual: usize,
    },

    /// A token could not be converted to a number.
    #[error("could not convert value {position} ({token:?}) to a number: {reason}")]
    NonNumericToken {
        /// 1-based position of the offending token
        position: usize,
        /// The token as submitted (trimmed)
        token: String,
        /// Underlying conversion failure text
        reason: String,
    },

    /// Scaling or model evaluation failed.
    #[error("Inference failed: {0}")]
    InferenceFailure(String),

    /// An artifact could not be read or is inconsistent.
    #[error("Failed to load artifact: {0}")]
    ArtifactLoad(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScreeningError {
    /// Create an inference failure.
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::InferenceFailure(msg.into())
    }

    /// Create an artifact load error.
    pub fn artifact(msg: impl Into<String>) -> Self {
        Self::ArtifactLoad(msg.into())
    }

    /// Create a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if this error was caused by the submitted values.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFeatureCount { .. } | Self::NonNumericToken { .. }
        )
    }
}

impl From<candle_core::Error> for ScreeningError {
    fn from(err: candle_core::Error) -> Self {
        ScreeningError::InferenceFailure(err.to_string())
    }
}
