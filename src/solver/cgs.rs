//! Preconditioned Conjugate Gradient Squared (Sonneveld 1989, Saad §7.4.1).
//!
//! Squares the BiCG residual polynomial so that no `Aᵀ` products are needed.
//! Converges roughly twice as fast as BiCG when it converges, with a rougher
//! residual history.

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
pub struct CgsSolver<T> {
    pub opts: SolverOptions<T>,
}

option_builders!(CgsSolver);

impl<M, T> IterativeLinearSystemSolver<M, T> for CgsSolver<T>
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
        let core = SolveCore::new("cgs", problem, &self.opts, usize::MAX, pc, monitor);
        Ok(Box::new(CgsSolution {
            core,
            r: Vec::new(),
            r_tld: Vec::new(),
            p: Vec::new(),
            q: Vec::new(),
            rho0: T::one(),
        }))
    }
}

struct CgsSolution<'a, M, T> {
    core: SolveCore<'a, M, T>,
    r: Vec<T>,
    r_tld: Vec<T>,
    p: Vec<T>,
    q: Vec<T>,
    rho0: T,
}

impl<'a, M, T> Solution<T> for CgsSolution<'a, M, T>
where
    M: LinearOperator<T>,
    T: Real,
{
    fn set_initials(&mut self, x0: &[T]) -> Result<(), KError> {
        self.r = self.core.start(x0)?;
        self.r_tld = self.r.clone();
        self.p = vec![T::zero(); self.r.len()];
        self.q = vec![T::zero(); self.r.len()];
        self.rho0 = T::one();
        Ok(())
    }

    fn step(&mut self) -> Result<(), KError> {
        self.core.begin_step()?;
        let ip = ();
        let rho1 = ip.dot(&self.r, &self.r_tld);
        if rho1 == T::zero() {
            return Err(self.core.breakdown("<r, r~> = 0"));
        }
        let beta = rho1 / self.rho0;
        let u = lincomb(T::one(), &self.r, beta, &self.q);
        // p = u + β (q + β p)
        let q_bp = lincomb(T::one(), &self.q, beta, &self.p);
        self.p = lincomb(T::one(), &u, beta, &q_bp);
        let p_hat = self.core.precond(&self.p)?;
        let v_hat = self.core.matvec(&p_hat);
        let sigma = ip.dot(&v_hat, &self.r_tld);
        if sigma == T::zero() {
            return Err(self.core.breakdown("<v^, r~> = 0"));
        }
        let alpha = rho1 / sigma;
        self.q = lincomb(T::one(), &u, -alpha, &v_hat);
        let u_hat = self.core.precond(&lincomb(T::one(), &u, T::one(), &self.q))?;
        axpy(alpha, &u_hat, &mut self.core.x);
        if self.core.refresh_due() {
            self.r = self.core.residual();
        } else {
            let q_hat = self.core.matvec(&u_hat);
            axpy(-alpha, &q_hat, &mut self.r);
        }
        self.rho0 = rho1;
        self.core.end_step(ip.norm(&self.r));
        Ok(())
    }

    delegate_core!();
}
