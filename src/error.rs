//! Error types for the revcast library.

use thiserror::Error;

/// Result type alias for revision-analysis operations.
pub type Result<T> = std::result::Result<T, RevcastError>;

/// Errors that can occur while building panels, deriving series, or fitting
/// regressions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RevcastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient observations for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Target-period related error (parse failure, ordering violation).
    #[error("period error: {0}")]
    PeriodError(String),

    /// Model has not been fitted yet.
    #[error("model must be fitted before applying corrections")]
    FitRequired,

    /// Numerically degenerate regression (singular or non-positive-definite
    /// design). Fatal for the offending regression only.
    #[error("degenerate regression: {0}")]
    Degenerate(String),

    /// A fit observed data at or after the date it is supposed to predict.
    /// This invalidates the real-time evaluation and always fails loudly.
    #[error("look-ahead violation: fit at {fit_period} used data from {data_period}")]
    LookaheadViolation {
        fit_period: String,
        data_period: String,
    },

    /// Index out of bounds.
    #[error("index out of bounds: {index} (size: {size})")]
    IndexOutOfBounds { index: usize, size: usize },

    /// Failure reading an input table.
    #[error("input error: {0}")]
    Input(String),
}
