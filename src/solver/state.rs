//! Per-solve state shared by every Krylov method.
//!
//! `SolveCore` owns the iterate, the preconditioner instance and the monitor
//! for exactly one solve. The algorithm-specific recurrence vectors live next
//! to it in each solver's `Solution` struct.

use log::{debug, trace, warn};

use crate::config::SolverOptions;
use crate::core::traits::{InnerProduct, LinearOperator, MatShape, Real};
use crate::core::LsProblem;
use crate::error::{ConvergenceFailure, KError};
use crate::preconditioner::Preconditioner;
use crate::utils::convergence::{SolveStats, Tolerance};
use crate::utils::monitor::IterationMonitor;

/// Rejects a rectangular `A` for methods that iterate in a single space.
pub(crate) fn require_square<M: MatShape, T>(problem: &LsProblem<M, T>) -> Result<(), KError> {
    if problem.nrows() != problem.ncols() {
        return Err(KError::IncompatibleDimensions { expected: problem.nrows(), found: problem.ncols() });
    }
    Ok(())
}

pub struct SolveCore<'a, M, T> {
    name: &'static str,
    problem: &'a LsProblem<M, T>,
    pc: Box<dyn Preconditioner<M, Vec<T>> + 'a>,
    monitor: Box<dyn IterationMonitor<T> + 'a>,
    tol: Tolerance<T>,
    max_iters: usize,
    refresh_rate: usize,
    b_norm: T,
    started: bool,
    pub(crate) x: Vec<T>,
    pub(crate) iterations: usize,
    pub(crate) res_norm: T,
    pub(crate) converged: bool,
}

impl<'a, M, T> SolveCore<'a, M, T>
where
    M: LinearOperator<T>,
    T: Real,
{
    /// `cap` is the algorithm's own bound (e.g. `ncols` for CG).
    pub(crate) fn new(
        name: &'static str,
        problem: &'a LsProblem<M, T>,
        opts: &SolverOptions<T>,
        cap: usize,
        pc: Box<dyn Preconditioner<M, Vec<T>> + 'a>,
        monitor: Box<dyn IterationMonitor<T> + 'a>,
    ) -> Self {
        let ip = ();
        let b_norm = ip.norm(&problem.b().to_vec());
        Self {
            name,
            problem,
            pc,
            monitor,
            tol: opts.tolerance,
            max_iters: opts.max_iters.min(problem.max_iterations()).min(cap),
            refresh_rate: opts.residual_refresh_rate,
            b_norm,
            started: false,
            x: vec![T::zero(); problem.ncols()],
            iterations: 0,
            res_norm: T::infinity(),
            converged: false,
        }
    }

    pub(crate) fn a(&self) -> &M {
        self.problem.a()
    }

    pub(crate) fn b(&self) -> &[T] {
        self.problem.b()
    }

    pub(crate) fn nrows(&self) -> usize {
        self.problem.nrows()
    }

    pub(crate) fn ncols(&self) -> usize {
        self.problem.ncols()
    }

    pub(crate) fn max_iters(&self) -> usize {
        self.max_iters
    }

    /// A · v
    pub(crate) fn matvec(&self, v: &Vec<T>) -> Vec<T> {
        let mut y = vec![T::zero(); self.nrows()];
        self.a().matvec(v, &mut y);
        y
    }

    /// Aᵀ · v
    pub(crate) fn mattransvec(&self, v: &Vec<T>) -> Vec<T> {
        let mut y = vec![T::zero(); self.ncols()];
        self.a().mattransvec(v, &mut y);
        y
    }

    /// M⁻¹ · r
    pub(crate) fn precond(&self, r: &Vec<T>) -> Result<Vec<T>, KError> {
        let mut z = vec![T::zero(); r.len()];
        self.pc.apply(r, &mut z)?;
        Ok(z)
    }

    /// M⁻ᵀ · r
    pub(crate) fn precond_t(&self, r: &Vec<T>) -> Result<Vec<T>, KError> {
        let mut z = vec![T::zero(); r.len()];
        self.pc.apply_transpose(r, &mut z)?;
        Ok(z)
    }

    /// b − A·x for the current iterate.
    pub(crate) fn residual(&self) -> Vec<T> {
        let ax = self.matvec(&self.x);
        self.b().iter().zip(&ax).map(|(&bi, &axi)| bi - axi).collect()
    }

    pub(crate) fn is_small(&self, norm: T) -> bool {
        self.tol.is_residual_small(norm, self.b_norm)
    }

    /// Replaces ‖b‖ as the scale of relative tolerances, for methods that
    /// measure a transformed residual.
    pub(crate) fn set_rhs_norm(&mut self, norm: T) {
        self.b_norm = norm;
    }

    /// Re-tests convergence on a different residual measure without
    /// reporting a new iterate.
    pub(crate) fn reassess(&mut self, res_norm: T) {
        self.res_norm = res_norm;
        self.converged = self.is_small(res_norm);
    }

    /// Keeps a converged verdict only if `‖b − A x‖` agrees with the
    /// recurrence estimate.
    pub(crate) fn confirm_converged(&mut self) {
        if !self.converged {
            return;
        }
        let ip = ();
        let true_norm = ip.norm(&self.residual());
        if !self.is_small(true_norm) {
            debug!(
                "{}: estimate {:.6e} passed but ||b - Ax|| = {:.6e} at iteration {}",
                self.name, self.res_norm, true_norm, self.iterations
            );
            self.res_norm = true_norm;
            self.converged = false;
        }
    }

    /// Loads `x0`, records it, and returns the initial residual.
    pub(crate) fn start(&mut self, x0: &[T]) -> Result<Vec<T>, KError> {
        if x0.len() != self.ncols() {
            return Err(KError::IncompatibleDimensions { expected: self.ncols(), found: x0.len() });
        }
        self.x = x0.to_vec();
        self.iterations = 0;
        self.started = true;
        let r = self.residual();
        let ip = ();
        self.res_norm = ip.norm(&r);
        self.converged = self.is_small(self.res_norm);
        self.monitor.add_iterate(&self.x);
        debug!("{}: start, ||r0|| = {:.6e}, budget {}", self.name, self.res_norm, self.max_iters);
        Ok(r)
    }

    /// Counts one step; fails if `set_initials` never ran.
    pub(crate) fn begin_step(&mut self) -> Result<(), KError> {
        if !self.started {
            return Err(KError::Unsupported("step() called before set_initials()"));
        }
        self.iterations += 1;
        Ok(())
    }

    /// True when the incrementally updated residual should be recomputed
    /// from scratch at the current iteration count.
    pub(crate) fn refresh_due(&self) -> bool {
        self.refresh_rate > 0 && self.iterations % self.refresh_rate == 0
    }

    /// Records the outcome of a completed step.
    pub(crate) fn end_step(&mut self, res_norm: T) {
        self.res_norm = res_norm;
        self.converged = self.is_small(res_norm);
        trace!("{} iter {}: residual = {:.6e}", self.name, self.iterations, res_norm);
        self.monitor.add_iterate(&self.x);
    }

    pub(crate) fn breakdown(&self, what: &str) -> KError {
        debug!("{}: breakdown at iteration {}: {}", self.name, self.iterations, what);
        KError::breakdown(what.to_string())
    }

    pub(crate) fn stats(&self) -> SolveStats<T> {
        SolveStats { iterations: self.iterations, final_residual: self.res_norm, converged: self.converged }
    }

    /// Records the final iterate and returns it, or the budget failure.
    pub(crate) fn finish(&mut self) -> Result<Vec<T>, KError> {
        self.monitor.add_iterate(&self.x);
        if self.converged {
            debug!("{}: converged in {} iterations, ||r|| = {:.6e}", self.name, self.iterations, self.res_norm);
            Ok(self.x.clone())
        } else {
            warn!("{}: no convergence after {} iterations, ||r|| = {:.6e}", self.name, self.iterations, self.res_norm);
            Err(ConvergenceFailure::max_iterations(self.max_iters).into())
        }
    }
}

/// Implements the bookkeeping half of [`Solution`](crate::solver::Solution)
/// for a struct with a `core: SolveCore` field.
macro_rules! delegate_core {
    () => {
        fn stats(&self) -> $crate::utils::convergence::SolveStats<T> {
            self.core.stats()
        }
        fn iterate(&self) -> &[T] {
            &self.core.x
        }
        fn iterations(&self) -> usize {
            self.core.iterations
        }
        fn is_converged(&self) -> bool {
            self.core.converged
        }
        fn max_iterations(&self) -> usize {
            self.core.max_iters()
        }
        fn finish(&mut self) -> Result<Vec<T>, $crate::error::KError> {
            self.core.finish()
        }
    };
}

pub(crate) use delegate_core;
