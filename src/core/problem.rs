//! The linear system handed to a solver.

use crate::core::traits::MatShape;
use crate::error::KError;

/// Immutable bundle of `A`, `b` and an iteration hint for `A x = b`.
#[derive(Clone, Debug)]
pub struct LsProblem<M, T> {
    a: M,
    b: Vec<T>,
    max_iters: usize,
}

impl<M: MatShape, T> LsProblem<M, T> {
    /// Fails with `IncompatibleDimensions` unless `A.nrows() == b.len()`.
    pub fn new(a: M, b: Vec<T>) -> Result<Self, KError> {
        if a.nrows() != b.len() {
            return Err(KError::IncompatibleDimensions { expected: a.nrows(), found: b.len() });
        }
        Ok(Self { a, b, max_iters: usize::MAX })
    }

    /// Caps every solve of this problem at `max_iters` steps.
    pub fn with_max_iterations(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    pub fn a(&self) -> &M {
        &self.a
    }

    pub fn b(&self) -> &[T] {
        &self.b
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iters
    }

    pub fn nrows(&self) -> usize {
        self.a.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.a.ncols()
    }
}
