//! CG on the normal equations (Saad §8.3): CGNR and CGNE.
//!
//! - CGNR minimizes ‖b − A x‖ by running CG on `AᵀA x = Aᵀb`.
//! - CGNE minimizes ‖x − x*‖ by running CG on `AAᵀ y = b`, `x = Aᵀy`.
//!
//! Both accept rectangular `A` and only need `A` and `Aᵀ` products. The
//! condition number is squared, so convergence may be slow. Step counts are
//! capped at `ncols(A)`.

use crate::config::SolverOptions;
use crate::core::traits::{InnerProduct, LinearOperator, Real};
use crate::core::wrappers::{axpy, lincomb};
use crate::core::LsProblem;
use crate::error::KError;
use crate::preconditioner::Preconditioner;
use crate::solver::state::{delegate_core, SolveCore};
use crate::solver::{IterativeLinearSystemSolver, Solution};
use crate::utils::monitor::IterationMonitor;

/// CG on the normal equations of the residual, `AᵀA x = Aᵀ b`.
#[derive(Debug, Clone)]
pub struct CgnrSolver<T> {
    pub opts: SolverOptions<T>,
}

/// CG on the normal equations of the error, `AAᵀ y = b`.
#[derive(Debug, Clone)]
pub struct CgneSolver<T> {
    pub opts: SolverOptions<T>,
}

option_builders!(CgnrSolver);
option_builders!(CgneSolver);

impl<M, T> IterativeLinearSystemSolver<M, T> for CgnrSolver<T>
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
        let core = SolveCore::new("cgnr", problem, &self.opts, problem.ncols(), pc, monitor);
        Ok(Box::new(NormalSolution { core, kind: Normal::Residual, r: Vec::new(), p: Vec::new(), rz0: T::one() }))
    }
}

impl<M, T> IterativeLinearSystemSolver<M, T> for CgneSolver<T>
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
        let core = SolveCore::new("cgne", problem, &self.opts, problem.ncols(), pc, monitor);
        Ok(Box::new(NormalSolution { core, kind: Normal::Error, r: Vec::new(), p: Vec::new(), rz0: T::one() }))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Normal {
    /// CGNR
    Residual,
    /// CGNE
    Error,
}

struct NormalSolution<'a, M, T> {
    core: SolveCore<'a, M, T>,
    kind: Normal,
    r: Vec<T>,
    p: Vec<T>,
    rz0: T,
}

impl<'a, M, T> NormalSolution<'a, M, T>
where
    M: LinearOperator<T>,
    T: Real,
{
    /// Direction update and step length for CGNR.
    fn residual_direction(&mut self) -> Result<(T, Vec<T>), KError> {
        let ip = ();
        let s = self.core.mattransvec(&self.r);
        let z = self.core.precond(&s)?;
        let rz = ip.dot(&z, &s);
        if rz == T::zero() {
            return Err(self.core.breakdown("<z, A^T r> = 0"));
        }
        self.p = lincomb(T::one(), &z, rz / self.rz0, &self.p);
        let w = self.core.matvec(&self.p);
        let ww = ip.dot(&w, &w);
        if ww == T::zero() {
            return Err(self.core.breakdown("<w, w> = 0"));
        }
        self.rz0 = rz;
        Ok((rz / ww, w))
    }

    /// Direction update and step length for CGNE.
    fn error_direction(&mut self) -> Result<(T, Vec<T>), KError> {
        let ip = ();
        let z = self.core.precond(&self.r)?;
        let rz = ip.dot(&z, &self.r);
        if rz == T::zero() {
            return Err(self.core.breakdown("<z, r> = 0"));
        }
        let atz = self.core.mattransvec(&z);
        self.p = lincomb(T::one(), &atz, rz / self.rz0, &self.p);
        let pp = ip.dot(&self.p, &self.p);
        if pp == T::zero() {
            return Err(self.core.breakdown("<p, p> = 0"));
        }
        self.rz0 = rz;
        Ok((rz / pp, self.core.matvec(&self.p)))
    }
}

impl<'a, M, T> Solution<T> for NormalSolution<'a, M, T>
where
    M: LinearOperator<T>,
    T: Real,
{
    fn set_initials(&mut self, x0: &[T]) -> Result<(), KError> {
        self.r = self.core.start(x0)?;
        self.p = vec![T::zero(); self.core.ncols()];
        self.rz0 = T::one();
        Ok(())
    }

    fn step(&mut self) -> Result<(), KError> {
        self.core.begin_step()?;
        let (alpha, ap) = match self.kind {
            Normal::Residual => self.residual_direction()?,
            Normal::Error => self.error_direction()?,
        };
        axpy(alpha, &self.p, &mut self.core.x);
        if self.core.refresh_due() {
            self.r = self.core.residual();
        } else {
            axpy(-alpha, &ap, &mut self.r);
        }
        let ip = ();
        self.core.end_step(ip.norm(&self.r));
        Ok(())
    }

    delegate_core!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::test_support::{nonsym_tridiag, problem, residual_norm};

    const OVERDETERMINED: [&[f64]; 3] = [&[1.0, 0.0], &[0.0, 1.0], &[1.0, 1.0]];

    #[test]
    fn cgnr_consistent_overdetermined() {
        let p = problem(&OVERDETERMINED, &[1.0, 2.0, 3.0]);
        let x = CgnrSolver::new(1e-10, 10).solve(&p).unwrap().search(&[0.0, 0.0]).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-9 && (x[1] - 2.0).abs() < 1e-9, "{x:?}");
    }

    #[test]
    fn cgne_consistent_overdetermined() {
        let p = problem(&OVERDETERMINED, &[1.0, 2.0, 3.0]);
        let x = CgneSolver::new(1e-10, 10).solve(&p).unwrap().search(&[0.0, 0.0]).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-9 && (x[1] - 2.0).abs() < 1e-9, "{x:?}");
    }

    #[test]
    fn square_nonsymmetric() {
        let p = LsProblem::new(nonsym_tridiag(6), vec![1.0; 6]).unwrap();
        for solver in [
            Box::new(CgnrSolver::new(1e-10, 50)) as Box<dyn IterativeLinearSystemSolver<faer::Mat<f64>, f64>>,
            Box::new(CgneSolver::new(1e-10, 50)),
        ] {
            let x = solver.solve(&p).unwrap().search(&[0.0; 6]).unwrap();
            assert!(residual_norm(&p, &x) <= 1e-10);
        }
    }

    #[test]
    fn cap_is_column_count() {
        let p = problem(&OVERDETERMINED, &[1.0, 2.0, 3.0]);
        let sol = CgnrSolver::new(1e-10, 100).solve(&p).unwrap();
        assert_eq!(sol.max_iterations(), 2);
    }
}
