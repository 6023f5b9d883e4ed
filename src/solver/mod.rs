//! Krylov solver interfaces.
//!
//! A solver is a reusable, immutable configuration ([`SolverOptions`] plus any
//! method-specific knobs). Calling [`IterativeLinearSystemSolver::solve`] on a
//! problem hands back a stateful [`Solution`], which can be driven to the end
//! with [`Solution::search`] or advanced one step at a time.
//!
//! Every solver follows the same contract:
//! - the initial guess, every completed step, and the returned vector are
//!   reported to the attached [`IterationMonitor`];
//! - a divisor of the recurrence that evaluates to exactly zero aborts with a
//!   `Breakdown` failure naming the quantity;
//! - running out of steps aborts with `MaxIterationsExceeded`.

use crate::config::SolverOptions;
use crate::core::traits::{LinearOperator, Real};
use crate::core::LsProblem;
use crate::error::KError;
use crate::preconditioner::{Preconditioner, PreconditionerFactory};
use crate::utils::convergence::SolveStats;
use crate::utils::monitor::{IterationMonitor, NullMonitor};

/// A solve in progress.
pub trait Solution<T> {
    /// Loads `x0`, computes the initial residual and resets the step count.
    fn set_initials(&mut self, x0: &[T]) -> Result<(), KError>;

    /// Advances by exactly one step of the method.
    fn step(&mut self) -> Result<(), KError>;

    fn stats(&self) -> SolveStats<T>;

    /// Current iterate.
    fn iterate(&self) -> &[T];

    fn iterations(&self) -> usize;

    fn is_converged(&self) -> bool;

    /// Effective step budget of this solve.
    fn max_iterations(&self) -> usize;

    /// Reports the final iterate and returns it, or `MaxIterationsExceeded`
    /// when the tolerance was not met.
    fn finish(&mut self) -> Result<Vec<T>, KError>;

    /// Runs the method from `x0` until convergence, breakdown or budget
    /// exhaustion.
    fn search(&mut self, x0: &[T]) -> Result<Vec<T>, KError> {
        self.set_initials(x0)?;
        while !self.is_converged() && self.iterations() < self.max_iterations() {
            self.step()?;
        }
        self.finish()
    }
}

/// An iterative method for `A x = b`.
pub trait IterativeLinearSystemSolver<M, T>
where
    M: LinearOperator<T>,
    T: Real,
{
    fn options(&self) -> &SolverOptions<T>;

    /// Starts a solve with an explicit preconditioner instance and monitor.
    fn solve_with<'a>(
        &self,
        problem: &'a LsProblem<M, T>,
        pc: Box<dyn Preconditioner<M, Vec<T>> + 'a>,
        monitor: Box<dyn IterationMonitor<T> + 'a>,
    ) -> Result<Box<dyn Solution<T> + 'a>, KError>;

    /// Starts a solve, building the configured preconditioner from `A`.
    fn solve_monitored<'a>(
        &self,
        problem: &'a LsProblem<M, T>,
        monitor: Box<dyn IterationMonitor<T> + 'a>,
    ) -> Result<Box<dyn Solution<T> + 'a>, KError> {
        let pc = PreconditionerFactory::<M, Vec<T>>::new_instance(&self.options().pc, problem.a())?;
        self.solve_with(problem, pc, monitor)
    }

    fn solve<'a>(&self, problem: &'a LsProblem<M, T>) -> Result<Box<dyn Solution<T> + 'a>, KError> {
        self.solve_monitored(problem, Box::new(NullMonitor))
    }
}

/// Constructors and `with_*` builders shared by every solver configuration.
macro_rules! option_builders {
    ($solver:ident) => {
        impl<T: $crate::core::traits::Real> $solver<T> {
            /// Absolute tolerance `tol`, at most `max_iters` steps, no preconditioner.
            pub fn new(tol: T, max_iters: usize) -> Self {
                Self::with_options($crate::config::SolverOptions::new(tol, max_iters))
            }

            pub fn with_options(opts: $crate::config::SolverOptions<T>) -> Self {
                Self { opts }
            }

            pub fn with_pc(mut self, pc: $crate::context::pc_context::PC<T>) -> Self {
                self.opts.pc = pc;
                self
            }

            pub fn with_tolerance(mut self, tolerance: $crate::utils::convergence::Tolerance<T>) -> Self {
                self.opts.tolerance = tolerance;
                self
            }

            pub fn with_refresh_rate(mut self, rate: usize) -> Self {
                self.opts.residual_refresh_rate = rate;
                self
            }
        }
    };
}

mod state;

pub mod bicg;
pub use bicg::BiCgSolver;

pub mod bicgstab;
pub use bicgstab::BiCgStabSolver;

pub mod cg;
pub use cg::CgSolver;

pub mod cgnr;
pub use cgnr::{CgneSolver, CgnrSolver};

pub mod cgs;
pub use cgs::CgsSolver;

pub mod gcr;
pub use gcr::GcrSolver;

pub mod gmres;
pub use gmres::GmresSolver;

pub mod minres;
pub use minres::MinresSolver;

pub mod qmr;
pub use qmr::QmrSolver;

pub mod steepest;
pub use steepest::SteepestDescentSolver;
