//! Preconditioned BiCGSTAB (van der Vorst 1992, Saad §7.4.2).
//!
//! Transpose-free: the shadow residual `r̃` is fixed at `r0`, and each step is
//! a BiCG half-step followed by a one-dimensional residual minimization. If
//! the intermediate residual `s` already satisfies the tolerance the second
//! half-step is skipped.

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
pub struct BiCgStabSolver<T> {
    pub opts: SolverOptions<T>,
}

option_builders!(BiCgStabSolver);

impl<M, T> IterativeLinearSystemSolver<M, T> for BiCgStabSolver<T>
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
        let core = SolveCore::new("bicgstab", problem, &self.opts, problem.ncols(), pc, monitor);
        Ok(Box::new(BiCgStabSolution {
            core,
            r: Vec::new(),
            r_hat: Vec::new(),
            p: Vec::new(),
            v: Vec::new(),
            rho0: T::one(),
            alpha: T::one(),
            omega: T::one(),
        }))
    }
}

struct BiCgStabSolution<'a, M, T> {
    core: SolveCore<'a, M, T>,
    r: Vec<T>,
    r_hat: Vec<T>,
    p: Vec<T>,
    v: Vec<T>,
    rho0: T,
    alpha: T,
    omega: T,
}

impl<'a, M, T> Solution<T> for BiCgStabSolution<'a, M, T>
where
    M: LinearOperator<T>,
    T: Real,
{
    fn set_initials(&mut self, x0: &[T]) -> Result<(), KError> {
        self.r = self.core.start(x0)?;
        self.r_hat = self.r.clone();
        self.p = vec![T::zero(); self.r.len()];
        self.v = vec![T::zero(); self.r.len()];
        self.rho0 = T::one();
        self.alpha = T::one();
        self.omega = T::one();
        Ok(())
    }

    fn step(&mut self) -> Result<(), KError> {
        self.core.begin_step()?;
        let ip = ();
        let rho = ip.dot(&self.r_hat, &self.r);
        if rho == T::zero() {
            return Err(self.core.breakdown("rho = <r^, r> = 0"));
        }
        let beta = (rho / self.rho0) * (self.alpha / self.omega);
        // p = r + β (p − ω v)
        let p_minus_wv = lincomb(T::one(), &self.p, -self.omega, &self.v);
        let p = lincomb(T::one(), &self.r, beta, &p_minus_wv);
        let p_hat = self.core.precond(&p)?;
        let v = self.core.matvec(&p_hat);
        let sigma = ip.dot(&self.r_hat, &v);
        if sigma == T::zero() {
            return Err(self.core.breakdown("sigma = <r^, v> = 0"));
        }
        let alpha = rho / sigma;
        let s = lincomb(T::one(), &self.r, -alpha, &v);
        let s_norm = ip.norm(&s);
        if self.core.is_small(s_norm) {
            axpy(alpha, &p_hat, &mut self.core.x);
            (self.p, self.v, self.alpha, self.r) = (p, v, alpha, s);
            self.core.end_step(s_norm);
            return Ok(());
        }
        let s_hat = self.core.precond(&s)?;
        let t = self.core.matvec(&s_hat);
        let tt = ip.dot(&t, &t);
        if tt == T::zero() {
            return Err(self.core.breakdown("<t, t> = 0"));
        }
        let omega = ip.dot(&t, &s) / tt;
        // s was not small, so r = s − ω t cannot converge with ω = 0
        if omega == T::zero() {
            return Err(self.core.breakdown("omega = 0"));
        }
        axpy(alpha, &p_hat, &mut self.core.x);
        axpy(omega, &s_hat, &mut self.core.x);
        (self.p, self.v, self.alpha, self.omega, self.rho0) = (p, v, alpha, omega, rho);
        if self.core.refresh_due() {
            self.r = self.core.residual();
        } else {
            self.r = lincomb(T::one(), &s, -omega, &t);
        }
        self.core.end_step(ip.norm(&self.r));
        Ok(())
    }

    delegate_core!();
}
