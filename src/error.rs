//! Error taxonomy shared by the reductions, the solver gateway and the search driver

use thiserror::Error;

/// Result alias used throughout the library
pub type PuzzleResult<T> = std::result::Result<T, PuzzleError>;

/// Errors raised by the core.
///
/// A negative answer (unsatisfiable formula, no path within the depth
/// bound) is never one of these; it is carried by the outcome types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    /// The caller supplied data the reduction or search cannot accept
    #[error("invalid input: {detail}")]
    InvalidInput { detail: String },

    /// An index tuple or variable id fell outside the declared bounds
    #[error("value {value} out of range (limit {limit})")]
    OutOfRange { value: i64, limit: i64 },

    /// The encoding disagrees with itself; always a defect in this crate
    #[error("internal encoding error: {detail}")]
    EncodingInternal { detail: String },

    /// No solver backend could be constructed
    #[error("solver unavailable: {detail}")]
    SolverUnavailable { detail: String },

    /// The solver did not answer within the configured wall-clock budget
    #[error("solver timed out after {seconds}s")]
    SolverTimeout { seconds: u64 },

    /// The solver answered but the answer cannot be used
    #[error("solver failure: {detail}")]
    SolverFailure { detail: String },
}

impl PuzzleError {
    pub fn invalid(detail: impl Into<String>) -> Self {
        PuzzleError::InvalidInput {
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        PuzzleError::EncodingInternal {
            detail: detail.into(),
        }
    }

    pub fn solver_failure(detail: impl Into<String>) -> Self {
        PuzzleError::SolverFailure {
            detail: detail.into(),
        }
    }

    /// Machine-readable kind, stable across releases
    pub fn kind(&self) -> &'static str {
        match self {
            PuzzleError::InvalidInput { .. } => "invalid_input",
            PuzzleError::OutOfRange { .. } => "out_of_range",
            PuzzleError::EncodingInternal { .. } => "encoding_internal_error",
            PuzzleError::SolverUnavailable { .. } => "solver_unavailable",
            PuzzleError::SolverTimeout { .. } => "solver_timeout",
            PuzzleError::SolverFailure { .. } => "solver_failure",
        }
    }

    /// True for errors caused by the caller's data rather than by the core or the solver
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            PuzzleError::InvalidInput { .. } | PuzzleError::OutOfRange { .. }
        )
    }
}
