//! Error types for sequence computation.

use thiserror::Error;

/// Result type for sequence operations.
pub type Result<T> = std::result::Result<T, CollatzError>;

/// Errors that can occur while generating or analyzing a trajectory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollatzError {
    /// The starting number was zero or negative.
    #[error("Starting number must be a positive integer (got {0})")]
    InvalidInput(i64),

    /// The trajectory did not reach 1 within the configured number of steps.
    #[error("Sequence for {start} did not reach 1 within {limit} steps")]
    IterationLimitExceeded { start: u64, limit: u64 },

    /// A `3n + 1` step does not fit in 64 bits.
    #[error("Sequence for {start} overflows at value {value}")]
    Overflow { start: u64, value: u64 },
}

impl CollatzError {
    /// Whether a range scan should skip this number and carry on.
    pub fn is_skippable(&self) -> bool {
        matches!(self, CollatzError::InvalidInput(_))
    }
}
