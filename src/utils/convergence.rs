//! Convergence tracking & tolerance checks for iterative solvers.

use num_traits::Float;

/// When a residual norm counts as small enough.
///
/// Every variant is monotone in the residual norm: once a norm is accepted,
/// every smaller norm is accepted too.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tolerance<T> {
    /// ‖r‖ ≤ tol
    Absolute(T),
    /// ‖r‖ ≤ rtol · ‖b‖
    Relative(T),
    /// ‖r‖ ≤ max(rtol · ‖b‖, atol)
    Mixed { rtol: T, atol: T },
}

impl<T: Float> Tolerance<T> {
    /// `res_norm` is the current residual norm, `rhs_norm` is ‖b‖.
    pub fn is_residual_small(&self, res_norm: T, rhs_norm: T) -> bool {
        res_norm <= self.threshold(rhs_norm)
    }

    /// The largest residual norm this policy accepts.
    pub fn threshold(&self, rhs_norm: T) -> T {
        match *self {
            Tolerance::Absolute(tol) => tol,
            Tolerance::Relative(rtol) => rtol * rhs_norm,
            Tolerance::Mixed { rtol, atol } => (rtol * rhs_norm).max(atol),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SolveStats<T> {
    pub iterations: usize,
    pub final_residual: T,
    pub converged: bool,
}
