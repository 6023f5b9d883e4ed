//! Restarted, left-preconditioned Generalized Conjugate Residual (Saad §6.9).
//!
//! Keeps every search direction of the current cycle and orthogonalizes each
//! new one against all of them in the `(M⁻¹A)`-image, so the work per step
//! grows with the cycle length. After `restart` directions the basis is
//! dropped and a new cycle starts from the true residual `b − A x`.

use log::debug;

use crate::config::SolverOptions;
use crate::core::traits::{InnerProduct, LinearOperator, Real};
use crate::core::wrappers::{axpy, scaled};
use crate::core::LsProblem;
use crate::error::KError;
use crate::preconditioner::Preconditioner;
use crate::solver::state::{delegate_core, require_square, SolveCore};
use crate::solver::{IterativeLinearSystemSolver, Solution};
use crate::utils::monitor::IterationMonitor;

#[derive(Debug, Clone)]
pub struct GcrSolver<T> {
    pub opts: SolverOptions<T>,
}

option_builders!(GcrSolver);

impl<T: Real> GcrSolver<T> {
    /// Drops the direction basis every `m` steps.
    pub fn with_restart(mut self, m: usize) -> Self {
        self.opts = self.opts.with_restart(m);
        self
    }
}

impl<M, T> IterativeLinearSystemSolver<M, T> for GcrSolver<T>
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
        let core = SolveCore::new("gcr", problem, &self.opts, usize::MAX, pc, monitor);
        let restart = self.opts.restart.unwrap_or(core.max_iters().min(problem.ncols())).max(1);
        Ok(Box::new(GcrSolution {
            core,
            restart,
            r: Vec::new(),
            r_hat: Vec::new(),
            dirs: Vec::new(),
            next: None,
        }))
    }
}

/// One search direction `p` with its images `q = A p` and `w = M⁻¹ q`.
struct Direction<T> {
    p: Vec<T>,
    q: Vec<T>,
    w: Vec<T>,
}

struct GcrSolution<'a, M, T> {
    core: SolveCore<'a, M, T>,
    restart: usize,
    r: Vec<T>,
    r_hat: Vec<T>,
    /// directions of the current cycle with `<w, w>`
    dirs: Vec<(Direction<T>, T)>,
    next: Option<Direction<T>>,
}

impl<'a, M, T> GcrSolution<'a, M, T>
where
    M: LinearOperator<T>,
    T: Real,
{
    /// First direction of a cycle: the normalized preconditioned residual.
    fn begin_cycle(&mut self) -> Result<Direction<T>, KError> {
        let ip = ();
        self.r = self.core.residual();
        self.r_hat = self.core.precond(&self.r)?;
        let nrm = ip.norm(&self.r_hat);
        if nrm == T::zero() {
            return Err(self.core.breakdown("||M^-1 r|| = 0"));
        }
        let p = scaled(T::one() / nrm, &self.r_hat);
        let q = self.core.matvec(&p);
        let w = self.core.precond(&q)?;
        Ok(Direction { p, q, w })
    }

    /// Next direction, orthogonal in the `w` images to the whole cycle.
    fn next_direction(&self) -> Result<Direction<T>, KError> {
        let ip = ();
        let q0 = self.core.matvec(&self.r_hat);
        let s = self.core.precond(&q0)?;
        let mut next = Direction { p: self.r_hat.clone(), q: q0, w: s.clone() };
        for (d, delta) in &self.dirs {
            let c = ip.dot(&s, &d.w) / *delta;
            axpy(-c, &d.p, &mut next.p);
            axpy(-c, &d.q, &mut next.q);
            axpy(-c, &d.w, &mut next.w);
        }
        Ok(next)
    }
}

impl<'a, M, T> Solution<T> for GcrSolution<'a, M, T>
where
    M: LinearOperator<T>,
    T: Real,
{
    fn set_initials(&mut self, x0: &[T]) -> Result<(), KError> {
        self.r = self.core.start(x0)?;
        self.dirs.clear();
        self.next = None;
        Ok(())
    }

    fn step(&mut self) -> Result<(), KError> {
        self.core.begin_step()?;
        let ip = ();
        let d = match self.next.take() {
            Some(d) => d,
            None => self.begin_cycle()?,
        };
        let delta = ip.dot(&d.w, &d.w);
        if delta == T::zero() {
            return Err(self.core.breakdown("<w, w> = 0"));
        }
        let alpha = ip.dot(&self.r_hat, &d.w) / delta;
        axpy(alpha, &d.p, &mut self.core.x);
        axpy(-alpha, &d.q, &mut self.r);
        axpy(-alpha, &d.w, &mut self.r_hat);
        self.dirs.push((d, delta));
        if self.core.refresh_due() {
            self.r = self.core.residual();
            self.r_hat = self.core.precond(&self.r)?;
        }
        self.core.end_step(ip.norm(&self.r));
        if self.core.converged {
            return Ok(());
        }
        if self.dirs.len() >= self.restart {
            debug!("gcr: restart after {} directions at iteration {}", self.dirs.len(), self.core.iterations);
            self.dirs.clear();
        } else {
            self.next = Some(self.next_direction()?);
        }
        Ok(())
    }

    delegate_core!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::pc_context::PC;
    use crate::error::FailureReason;
    use crate::solver::test_support::{nonsym_tridiag, problem, residual_norm};

    #[test]
    fn gcr_solves_nonsymmetric() {
        let p = LsProblem::new(nonsym_tridiag(10), vec![1.0; 10]).unwrap();
        let x = GcrSolver::new(1e-10, 50).solve(&p).unwrap().search(&[0.0; 10]).unwrap();
        assert!(residual_norm(&p, &x) <= 1e-10);
    }

    #[test]
    fn restarted_gcr_still_converges() {
        let p = LsProblem::new(nonsym_tridiag(16), vec![1.0; 16]).unwrap();
        let solver = GcrSolver::new(1e-10, 400).with_restart(3).with_pc(PC::Jacobi);
        let mut sol = solver.solve(&p).unwrap();
        let x = sol.search(&[0.0; 16]).unwrap();
        assert!(sol.iterations() > 3);
        assert!(residual_norm(&p, &x) <= 1e-10);
    }

    #[test]
    fn zero_matrix_breaks_down() {
        let p = problem(&[&[0.0, 0.0], &[0.0, 0.0]], &[1.0, 1.0]);
        let err = GcrSolver::new(1e-10, 5).solve(&p).unwrap().search(&[0.0, 0.0]).unwrap_err();
        assert_eq!(err.failure_reason(), Some(FailureReason::Breakdown));
        assert!(err.to_string().contains("<w, w> = 0"));
    }
}
