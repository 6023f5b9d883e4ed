//! Restarted, left-preconditioned GMRES (Saad §6.5, §9.3.1).
//!
//! Each step adds one Arnoldi vector (modified Gram-Schmidt, applied twice)
//! and one column of the `(m+1) × m` Hessenberg matrix `H`. The column is
//! brought to triangular form by the rotations accumulated so far plus one
//! new [`GivensRotation`], which is also applied to the right-hand side `g`;
//! `|g[j+1]|` is then the residual norm of the least-squares iterate, so
//! convergence is known without forming `x`.
//!
//! A cycle closes on convergence, on a happy breakdown (`H[j+1, j] = 0`), after
//! `restart` steps, or when the budget runs out. Closing solves
//! `R y = g` by back substitution, updates `x += V y` and recomputes the true
//! preconditioned residual `M⁻¹(b − A x)`.
//!
//! Convergence is measured on `‖M⁻¹ r‖`; relative tolerances are scaled by
//! `‖M⁻¹ b‖` so both sides of the test live in the preconditioned norm.
//!
//! # References
//! - Saad, Y. (2003). Iterative Methods for Sparse Linear Systems, 2nd Edition. SIAM.
//! - https://en.wikipedia.org/wiki/Generalized_minimal_residual_method

use faer::Mat;
use log::debug;

use crate::config::SolverOptions;
use crate::core::traits::{InnerProduct, LinearOperator, Real};
use crate::core::wrappers::{axpy, scaled};
use crate::core::LsProblem;
use crate::error::KError;
use crate::preconditioner::Preconditioner;
use crate::solver::state::{delegate_core, require_square, SolveCore};
use crate::solver::{IterativeLinearSystemSolver, Solution};
use crate::utils::givens::{back_substitute, GivensRotation};
use crate::utils::monitor::IterationMonitor;

/// GMRES solver configuration; `opts.restart` is the Arnoldi cycle length.
#[derive(Debug, Clone)]
pub struct GmresSolver<T> {
    pub opts: SolverOptions<T>,
}

option_builders!(GmresSolver);

impl<T: Real> GmresSolver<T> {
    /// Number of Arnoldi vectors before restart.
    pub fn with_restart(mut self, m: usize) -> Self {
        self.opts = self.opts.with_restart(m);
        self
    }
}

impl<M, T> IterativeLinearSystemSolver<M, T> for GmresSolver<T>
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
        // unrestarted GMRES terminates within n steps in exact arithmetic
        let cap = match self.opts.restart {
            Some(_) => usize::MAX,
            None => problem.ncols(),
        };
        let core = SolveCore::new("gmres", problem, &self.opts, cap, pc, monitor);
        let restart = self.opts.restart.unwrap_or(core.max_iters()).max(1);
        Ok(Box::new(GmresSolution {
            core,
            restart,
            v: Vec::with_capacity(restart + 1),
            h: Mat::from_fn(restart + 1, restart, |_, _| T::zero()),
            g: vec![T::zero(); restart + 1],
            rotations: Vec::with_capacity(restart),
        }))
    }
}

struct GmresSolution<'a, M, T> {
    core: SolveCore<'a, M, T>,
    restart: usize,
    /// Arnoldi basis of the open cycle; empty between cycles.
    v: Vec<Vec<T>>,
    h: Mat<T>,
    g: Vec<T>,
    rotations: Vec<GivensRotation<T>>,
}

impl<'a, M, T> GmresSolution<'a, M, T>
where
    M: LinearOperator<T>,
    T: Real,
{
    fn begin_cycle(&mut self) -> Result<(), KError> {
        let ip = ();
        let z = self.core.precond(&self.core.residual())?;
        let beta = ip.norm(&z);
        if beta == T::zero() {
            return Err(self.core.breakdown("||M^-1 r|| = 0"));
        }
        for j in 0..self.restart {
            for i in 0..=self.restart {
                self.h[(i, j)] = T::zero();
            }
        }
        self.g.iter_mut().for_each(|gi| *gi = T::zero());
        self.g[0] = beta;
        self.rotations.clear();
        self.v.clear();
        self.v.push(scaled(T::one() / beta, &z));
        Ok(())
    }

    /// Fills column `j` of `H` and returns the unnormalized next vector.
    fn arnoldi(&mut self, j: usize) -> Result<Vec<T>, KError> {
        let ip = ();
        let mut w = self.core.precond(&self.core.matvec(&self.v[j]))?;
        // second pass restores orthogonality lost to cancellation
        for _ in 0..2 {
            for i in 0..=j {
                let hij = ip.dot(&w, &self.v[i]);
                self.h[(i, j)] = self.h[(i, j)] + hij;
                axpy(-hij, &self.v[i], &mut w);
            }
        }
        self.h[(j + 1, j)] = ip.norm(&w);
        Ok(w)
    }

    /// Solves the triangular system of the open cycle and moves `x`.
    fn close_cycle(&mut self, k: usize) -> Result<(), KError> {
        let y = back_substitute(&self.h, &self.g, k).inspect_err(|e| {
            debug!("gmres: {} at iteration {}", e, self.core.iterations);
        })?;
        for (yi, vi) in y.iter().zip(&self.v) {
            axpy(*yi, vi, &mut self.core.x);
        }
        self.v.clear();
        let ip = ();
        let z = self.core.precond(&self.core.residual())?;
        self.core.end_step(ip.norm(&z));
        if !self.core.converged {
            debug!("gmres: restart at iteration {}", self.core.iterations);
        }
        Ok(())
    }
}

impl<'a, M, T> Solution<T> for GmresSolution<'a, M, T>
where
    M: LinearOperator<T>,
    T: Real,
{
    fn set_initials(&mut self, x0: &[T]) -> Result<(), KError> {
        let ip = ();
        let r = self.core.start(x0)?;
        // the minimized quantity is ‖M⁻¹ r‖, so relative tolerances scale with ‖M⁻¹ b‖
        let pb = self.core.precond(&self.core.b().to_vec())?;
        self.core.set_rhs_norm(ip.norm(&pb));
        let z = self.core.precond(&r)?;
        self.core.reassess(ip.norm(&z));
        self.v.clear();
        self.rotations.clear();
        Ok(())
    }

    fn step(&mut self) -> Result<(), KError> {
        self.core.begin_step()?;
        if self.v.is_empty() {
            self.begin_cycle()?;
        }
        let j = self.v.len() - 1;
        let w = self.arnoldi(j)?;
        let h_next = self.h[(j + 1, j)];
        for (i, rot) in self.rotations.iter().enumerate() {
            rot.apply_rows(&mut self.h, i, i + 1, j..j + 1);
        }
        let (rot, _) = GivensRotation::new(self.h[(j, j)], h_next)
            .ok_or_else(|| self.core.breakdown("Givens rotation with H[j, j] = H[j+1, j] = 0"))?;
        rot.apply_rows(&mut self.h, j, j + 1, j..j + 1);
        let (gj, gj1) = rot.apply(self.g[j], self.g[j + 1]);
        self.g[j] = gj;
        self.g[j + 1] = gj1;
        self.rotations.push(rot);

        let res = gj1.abs();
        let happy = h_next == T::zero();
        if !happy {
            self.v.push(scaled(T::one() / h_next, &w));
        }
        let k = j + 1;
        if self.core.is_small(res) || happy || k == self.restart || self.core.iterations >= self.core.max_iters() {
            self.close_cycle(k)
        } else {
            self.core.end_step(res);
            Ok(())
        }
    }

    delegate_core!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::pc_context::PC;
    use crate::solver::test_support::{nonsym_tridiag, problem, residual_norm};
    use crate::utils::convergence::Tolerance;
    use crate::utils::monitor::HistoryMonitor;

    #[test]
    fn gmres_solves_nonsymmetric() {
        let p = LsProblem::new(nonsym_tridiag(12), (0..12).map(|i| (i % 3) as f64).collect()).unwrap();
        let x = GmresSolver::new(1e-10, 100).solve(&p).unwrap().search(&[0.0; 12]).unwrap();
        assert!(residual_norm(&p, &x) <= 1e-10);
    }

    #[test]
    fn restarted_with_preconditioner() {
        let p = LsProblem::new(nonsym_tridiag(20), vec![1.0; 20]).unwrap();
        let solver = GmresSolver::new(1e-9, 200).with_restart(4).with_pc(PC::Ssor { omega: 1.0 });
        let mut sol = solver.solve(&p).unwrap();
        let x = sol.search(&[0.0; 20]).unwrap();
        assert!(sol.stats().converged);
        // tolerance applies to the preconditioned residual
        assert!(residual_norm(&p, &x) <= 1e-6);
    }

    #[test]
    fn singular_consistent_system_terminates() {
        let p = problem(&[&[1.0, 0.0], &[0.0, 0.0]], &[1.0, 0.0]);
        let x = GmresSolver::new(1e-10, 10).solve(&p).unwrap().search(&[0.0, 0.0]).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-12);
        assert_eq!(x[1], 0.0);
    }

    #[test]
    fn relative_tolerance_uses_preconditioned_rhs() {
        // Jacobi divides by 4000, so ‖M⁻¹ r‖ ≤ rtol ‖b‖ would accept ‖r‖ ≈ 4000 rtol ‖b‖
        let stencil = nonsym_tridiag(12);
        let a = Mat::from_fn(12, 12, |i, j| 1000.0 * stencil[(i, j)]);
        let b = vec![1.0; 12];
        let b_norm = 12f64.sqrt();
        let p = LsProblem::new(a, b).unwrap();
        let solver = GmresSolver::new(0.0, 100)
            .with_restart(3)
            .with_pc(PC::Jacobi)
            .with_tolerance(Tolerance::Relative(1e-6));
        let mut sol = solver.solve(&p).unwrap();
        let x = sol.search(&[0.0; 12]).unwrap();
        assert!(sol.stats().converged);
        assert!(residual_norm(&p, &x) <= 1e-6 * b_norm * (1.0 + 1e-9));
    }

    #[test]
    fn inner_iterations_are_reported() {
        let p = LsProblem::new(nonsym_tridiag(6), vec![1.0; 6]).unwrap();
        let mut history = HistoryMonitor::new();
        let mut sol = GmresSolver::new(1e-10, 50).solve_monitored(&p, Box::new(&mut history)).unwrap();
        sol.search(&[0.0; 6]).unwrap();
        let steps = sol.iterations();
        drop(sol);
        assert_eq!(history.len(), steps + 2);
    }
}
