//! Preconditioned steepest descent.
//!
//! Each step moves along the preconditioned residual with an exact line
//! search. No conjugation, so there is no `n`-step cap.

use crate::config::SolverOptions;
use crate::core::traits::{InnerProduct, LinearOperator, Real};
use crate::core::wrappers::axpy;
use crate::core::LsProblem;
use crate::error::KError;
use crate::preconditioner::Preconditioner;
use crate::solver::state::{delegate_core, require_square, SolveCore};
use crate::solver::{IterativeLinearSystemSolver, Solution};
use crate::utils::monitor::IterationMonitor;

#[derive(Debug, Clone)]
pub struct SteepestDescentSolver<T> {
    pub opts: SolverOptions<T>,
}

option_builders!(SteepestDescentSolver);

impl<M, T> IterativeLinearSystemSolver<M, T> for SteepestDescentSolver<T>
where
    M: LinearOperator<T>,
    T: Real,
{
    fn options(&self) -> &SolverOptions<T> {
        &self.opts
    }

    fn solve_with<'a>(
        &self,
        problem: &'a LsProblem<M, T>,
        pc: Box<dyn Preconditioner<M, Vec<T>> + 'a>,
        monitor: Box<dyn IterationMonitor<T> + 'a>,
    ) -> Result<Box<dyn Solution<T> + 'a>, KError> {
        require_square(problem)?;
        let core = SolveCore::new("steepest-descent", problem, &self.opts, usize::MAX, pc, monitor);
        Ok(Box::new(SteepestDescentSolution { core, r: Vec::new() }))
    }
}

struct SteepestDescentSolution<'a, M, T> {
    core: SolveCore<'a, M, T>,
    r: Vec<T>,
}

impl<'a, M, T> Solution<T> for SteepestDescentSolution<'a, M, T>
where
    M: LinearOperator<T>,
    T: Real,
{
    fn set_initials(&mut self, x0: &[T]) -> Result<(), KError> {
        self.r = self.core.start(x0)?;
        Ok(())
    }

    fn step(&mut self) -> Result<(), KError> {
        self.core.begin_step()?;
        let ip = ();
        let z = self.core.precond(&self.r)?;
        let q = self.core.matvec(&z);
        let alpha = ip.dot(&self.r, &z) / ip.dot(&q, &z);
        axpy(alpha, &z, &mut self.core.x);
        if self.core.refresh_due() {
            self.r = self.core.residual();
        } else {
            axpy(-alpha, &q, &mut self.r);
        }
        self.core.end_step(ip.norm(&self.r));
        Ok(())
    }

    delegate_core!();
}
