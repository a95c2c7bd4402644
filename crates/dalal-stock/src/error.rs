//! Error types for the decision pipeline

use thiserror::Error;

/// Pipeline-specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// API request failed
    #[error("API error: {0}")]
    ApiError(String),

    /// Invalid stock symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Market data provider error
    #[error("Market data error: {0}")]
    MarketDataError(String),

    /// Technical indicator calculation error
    #[error("Technical indicator error: {0}")]
    IndicatorError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, StockError>;

/// Convert dalal_core::Error to StockError
impl From<dalal_core::Error> for StockError {
    fn from(err: dalal_core::Error) -> Self {
        StockError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StockError::InvalidSymbol("INVALID".to_string());
        assert_eq!(err.to_string(), "Invalid symbol: INVALID");

        let err = StockError::DataUnavailable {
            symbol: "RELIANCE".to_string(),
            reason: "No data found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Data not available for RELIANCE: No data found"
        );
    }

    #[test]
    fn test_core_error_conversion() {
        let core_err = dalal_core::Error::ModelFailed("timeout".to_string());
        let err: StockError = core_err.into();
        assert!(err.to_string().contains("timeout"));
    }
}
