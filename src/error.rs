use std::fmt;

use thiserror::Error;

// Unified error type for kryls

/// Why an iterative solve gave up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureReason {
    /// A divisor of the Krylov recurrence computed to exactly zero.
    Breakdown,
    /// The iteration budget ran out before the tolerance was met.
    MaxIterationsExceeded,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Breakdown => write!(f, "breakdown"),
            FailureReason::MaxIterationsExceeded => write!(f, "maximum iterations exceeded"),
        }
    }
}

/// Fatal outcome of `search`/`step`, tagged with a [`FailureReason`].
#[derive(Error, Clone, Debug, PartialEq)]
#[error("{reason}: {message}")]
pub struct ConvergenceFailure {
    pub reason: FailureReason,
    pub message: String,
}

impl ConvergenceFailure {
    pub fn breakdown(message: impl Into<String>) -> Self {
        Self { reason: FailureReason::Breakdown, message: message.into() }
    }

    pub fn max_iterations(budget: usize) -> Self {
        Self {
            reason: FailureReason::MaxIterationsExceeded,
            message: format!("no convergence within {budget} iterations"),
        }
    }
}

#[derive(Error, Debug)]
pub enum KError {
    #[error(transparent)]
    Convergence(#[from] ConvergenceFailure),
    #[error("incompatible dimensions: expected {expected}, found {found}")]
    IncompatibleDimensions { expected: usize, found: usize },
    #[error("factorization error: {0}")]
    FactorError(String),
    #[error("indefinite preconditioner detected (<r, M^-1 r> < 0)")]
    IndefinitePreconditioner,
    #[error("zero pivot at row {0}")]
    ZeroPivot(usize),
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}

impl KError {
    /// Shorthand for a `Breakdown` convergence failure.
    pub fn breakdown(message: impl Into<String>) -> Self {
        KError::Convergence(ConvergenceFailure::breakdown(message))
    }

    /// The convergence failure tag, if this error is one.
    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            KError::Convergence(f) => Some(f.reason),
            _ => None,
        }
    }

    pub fn is_breakdown(&self) -> bool {
        self.failure_reason() == Some(FailureReason::Breakdown)
    }
}
