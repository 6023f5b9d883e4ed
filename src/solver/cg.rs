//! Preconditioned Conjugate Gradient per Saad §9.2.
//!
//! For symmetric positive definite `A` (and SPD preconditioner). The step
//! count is capped at `ncols(A)`: in exact arithmetic CG terminates within
//! `n` steps.

use crate::config::SolverOptions;
use crate::core::traits::{InnerProduct, LinearOperator, Real};
use crate::core::wrappers::{axpy, lincomb};
use crate::core::LsProblem;
use crate::error::KError;
use crate::preconditioner::Preconditioner;
use crate::solver::state::{delegate_core, require_square, SolveCore};
use crate::solver::{IterativeLinearSystemSolver, Solution};
use crate::utils::monitor::IterationMonitor;

#[derive(Debug, Clone)]
pub struct CgSolver<T> {
    pub opts: SolverOptions<T>,
}

option_builders!(CgSolver);

impl<M, T> IterativeLinearSystemSolver<M, T> for CgSolver<T>
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
        let core = SolveCore::new("cg", problem, &self.opts, problem.ncols(), pc, monitor);
        Ok(Box::new(CgSolution { core, r: Vec::new(), p: Vec::new(), rtz0: T::one() }))
    }
}

struct CgSolution<'a, M, T> {
    core: SolveCore<'a, M, T>,
    r: Vec<T>,
    p: Vec<T>,
    rtz0: T,
}

impl<'a, M, T> Solution<T> for CgSolution<'a, M, T>
where
    M: LinearOperator<T>,
    T: Real,
{
    fn set_initials(&mut self, x0: &[T]) -> Result<(), KError> {
        self.r = self.core.start(x0)?;
        self.p = vec![T::zero(); self.r.len()];
        self.rtz0 = T::one();
        Ok(())
    }

    fn step(&mut self) -> Result<(), KError> {
        self.core.begin_step()?;
        let ip = ();
        let z = self.core.precond(&self.r)?;
        let rtz = ip.dot(&self.r, &z);
        if rtz == T::zero() {
            return Err(self.core.breakdown("<r, z> = 0"));
        }
        let beta = rtz / self.rtz0;
        self.p = lincomb(T::one(), &z, beta, &self.p);
        let q = self.core.matvec(&self.p);
        let pq = ip.dot(&self.p, &q);
        if pq == T::zero() {
            return Err(self.core.breakdown("<p, q> = 0"));
        }
        let alpha = rtz / pq;
        axpy(alpha, &self.p, &mut self.core.x);
        if self.core.refresh_due() {
            self.r = self.core.residual();
        } else {
            axpy(-alpha, &q, &mut self.r);
        }
        self.rtz0 = rtz;
        self.core.end_step(ip.norm(&self.r));
        Ok(())
    }

    delegate_core!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::pc_context::PC;
    use crate::core::traits::{MatShape, MatTransVec, MatVec, MatrixGet};
    use crate::error::FailureReason;
    use crate::solver::test_support::{problem, residual_norm, spd_tridiag};
    use crate::utils::monitor::HistoryMonitor;

    // Simple dense matrix type for testing
    #[derive(Clone)]
    struct DenseMat {
        data: Vec<Vec<f64>>,
    }
    impl MatVec<Vec<f64>> for DenseMat {
        fn matvec(&self, x: &Vec<f64>, y: &mut Vec<f64>) {
            for (i, row) in self.data.iter().enumerate() {
                y[i] = row.iter().zip(x.iter()).map(|(a, b)| a * b).sum();
            }
        }
    }
    impl MatTransVec<Vec<f64>> for DenseMat {
        fn mattransvec(&self, x: &Vec<f64>, y: &mut Vec<f64>) {
            for (j, yj) in y.iter_mut().enumerate() {
                *yj = self.data.iter().zip(x.iter()).map(|(row, xi)| row[j] * xi).sum();
            }
        }
    }
    impl MatShape for DenseMat {
        fn nrows(&self) -> usize {
            self.data.len()
        }
        fn ncols(&self) -> usize {
            self.data[0].len()
        }
    }
    impl MatrixGet<f64> for DenseMat {
        fn get(&self, i: usize, j: usize) -> f64 {
            self.data[i][j]
        }
    }

    #[test]
    fn cg_solves_simple_spd() {
        // SPD system: [[4,1],[1,3]] x = [1,2] from x0 = [2,1]
        let a = DenseMat { data: vec![vec![4.0, 1.0], vec![1.0, 3.0]] };
        let p = LsProblem::new(a, vec![1.0, 2.0]).unwrap();
        let solver = CgSolver::new(1e-10, 10);
        let x = solver.solve(&p).unwrap().search(&[2.0, 1.0]).unwrap();
        let expected = [1.0 / 11.0, 7.0 / 11.0];
        for (xi, ei) in x.iter().zip(expected.iter()) {
            assert!((xi - ei).abs() < 1e-8, "xi = {}, expected = {}", xi, ei);
        }
        let mut ax = vec![0.0; 2];
        p.a().matvec(&x, &mut ax);
        let res = ((ax[0] - 1.0).powi(2) + (ax[1] - 2.0).powi(2)).sqrt();
        assert!(res < 1e-10, "residual = {res:e}");
    }

    #[test]
    fn cg_solves_spd_in_n_steps() {
        let a = spd_tridiag(8);
        let x_true: Vec<f64> = (0..8).map(|i| i as f64 - 3.0).collect();
        let mut b = vec![0.0; 8];
        a.matvec(&x_true, &mut b);
        let p = LsProblem::new(a, b).unwrap();
        let solver = CgSolver::new(1e-10, 100);
        let mut sol = solver.solve(&p).unwrap();
        let x = sol.search(&[0.0; 8]).unwrap();
        assert!(sol.stats().converged);
        assert!(sol.max_iterations() <= 8, "cap is ncols");
        assert!(residual_norm(&p, &x) <= 1e-10);
    }

    #[test]
    fn one_step_budget_is_exceeded() {
        let p = problem(&[&[4.0, 1.0], &[1.0, 3.0]], &[1.0, 2.0]);
        let err = CgSolver::new(1e-10, 1).solve(&p).unwrap().search(&[2.0, 1.0]).unwrap_err();
        assert_eq!(err.failure_reason(), Some(FailureReason::MaxIterationsExceeded));
    }

    #[test]
    fn indefinite_matrix_breaks_down_on_pq() {
        // p = r = [1, 1] is A-isotropic: <p, Ap> = 1 - 1 = 0
        let p = problem(&[&[1.0, 0.0], &[0.0, -1.0]], &[1.0, 1.0]);
        let err = CgSolver::new(1e-10, 10).solve(&p).unwrap().search(&[0.0, 0.0]).unwrap_err();
        assert!(err.is_breakdown());
        assert!(err.to_string().contains("<p, q> = 0"), "{err}");
    }

    #[test]
    fn indefinite_preconditioner_breaks_down_on_rz() {
        // Jacobi z = [1, -1] for r = [1, 1]: <r, z> = 0
        let p = problem(&[&[1.0, 2.0], &[2.0, -1.0]], &[1.0, 1.0]);
        let solver = CgSolver::new(1e-10, 10).with_pc(PC::Jacobi);
        let err = solver.solve(&p).unwrap().search(&[0.0, 0.0]).unwrap_err();
        assert!(err.to_string().contains("<r, z> = 0"), "{err}");
    }

    #[test]
    fn exact_guess_takes_no_steps() {
        let p = problem(&[&[2.0, 0.0], &[0.0, 2.0]], &[2.0, 4.0]);
        let mut history = HistoryMonitor::new();
        let solver = CgSolver::new(1e-12, 10);
        let x = solver
            .solve_monitored(&p, Box::new(&mut history))
            .unwrap()
            .search(&[1.0, 2.0])
            .unwrap();
        assert_eq!(x, vec![1.0, 2.0]);
        // initial guess plus final vector
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn step_before_initials_is_rejected() {
        let p = problem(&[&[1.0]], &[1.0]);
        let mut sol = CgSolver::new(1e-10, 5).solve(&p).unwrap();
        assert!(matches!(sol.step(), Err(KError::Unsupported(_))));
    }
}
