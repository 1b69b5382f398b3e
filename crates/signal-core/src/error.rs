//! Signal Error Types

use thiserror::Error;

/// Errors raised by signal construction and processing stages
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EcgError {
    /// Signal has no samples
    #[error("Signal contains no samples")]
    EmptySignal,

    /// Sampling rate must be a positive number of Hz
    #[error("Invalid sampling rate: {0} Hz")]
    InvalidSamplingRate(u32),

    /// Too few samples for the requested operation
    #[error("Insufficient data: need more than {required} samples, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Two series that must align do not
    #[error("Length mismatch: expected {expected} samples, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Parameter outside its valid domain
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result alias for signal operations
pub type Result<T> = std::result::Result<T, EcgError>;
