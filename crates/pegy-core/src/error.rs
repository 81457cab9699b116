//! Error types for PEGY computation and caching

use thiserror::Error;

/// Result type alias for pegy-core
pub type Result<T> = std::result::Result<T, PegyError>;

/// Errors raised by market data sources and caches
///
/// The calculator itself never fails; these errors surface from the
/// collaborators it is handed and end up as error rows in a batch.
#[derive(Debug, Error)]
pub enum PegyError {
    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable {
        symbol: String,
        reason: String,
    },

    /// Upstream provider failed
    #[error("Source error: {0}")]
    Source(String),

    /// Unrecognised option value (column, sort order, yield basis)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Cache read or write failed
    #[error("Cache error: {0}")]
    Cache(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PegyError::DataUnavailable {
            symbol: "MSFT".to_string(),
            reason: "no earnings trend".to_string(),
        };
        assert_eq!(err.to_string(), "Data not available for MSFT: no earnings trend");
    }

    #[test]
    fn test_json_conversion() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: PegyError = parse.unwrap_err().into();
        assert!(matches!(err, PegyError::Json(_)));
    }
}
