//! Error types for offset-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OffsetError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Unknown offset prefix: {0}")]
    UnknownPrefix(String),

    #[error("Unsupported combination: {0}")]
    UnsupportedCombination(String),

    #[error("No vectorized implementation: {0}")]
    NoVectorizedImplementation(String),

    /// The result does not fit the nanosecond-precision range. Offsets recover
    /// from this by recomputing on the wide representation.
    #[error("Out of bounds nanosecond timestamp: {0}")]
    OutOfBounds(String),

    #[error("Overflow: {0}")]
    Overflow(String),

    #[error("Non-monotonic offset: {0}")]
    NonMonotonic(String),
}

pub type Result<T> = std::result::Result<T, OffsetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let err = OffsetError::InvalidParameter("week must be 0<=week<=3, got 4".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid parameter: week must be 0<=week<=3, got 4"
        );

        let err = OffsetError::NonMonotonic("Offset <BusinessDay> did not increment date".into());
        assert!(err.to_string().starts_with("Non-monotonic offset"));
    }

    #[test]
    fn test_error_is_send_sync_std_error() {
        fn assert_impl<T: std::error::Error + Send + Sync + 'static>() {}
        assert_impl::<OffsetError>();
    }
}
