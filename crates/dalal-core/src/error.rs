//! Error types for dalal-core

use thiserror::Error;

/// Result type alias for dalal-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// A model invocation failed
    ///
    /// Callers are expected to recover by degrading to the documented
    /// fallback (general intent, neutral sentiment, no forecast).
    #[error("Model inference failed: {0}")]
    ModelFailed(String),

    /// The model was given input it cannot score (e.g. too little history)
    #[error("Insufficient input: {0}")]
    InsufficientInput(String),
}
