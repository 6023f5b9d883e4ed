//! Quasi-Minimal Residual method without look-ahead (Freund & Nachtigal 1991).
//!
//! Two-sided Lanczos builds the bases `v` (with `A`) and `w` (with `Aᵀ`);
//! the iterate is smoothed by a quasi-minimization carried through the scalar
//! recurrences `θ`, `γ`, `η` instead of explicit rotation matrices.
//!
//! Preconditioning is split, `M = M1 M2`: `M1` is the solver's configured
//! `pc` and `M2` is `right_pc`. Any vanishing Lanczos quantity is a hard
//! breakdown; there is no look-ahead. The true residual is recomputed after
//! every step.

use crate::config::SolverOptions;
use crate::context::pc_context::PC;
use crate::core::traits::{InnerProduct, LinearOperator, Real};
use crate::core::wrappers::{axpy, lincomb, scaled};
use crate::core::LsProblem;
use crate::error::KError;
use crate::preconditioner::Preconditioner;
use crate::solver::state::{delegate_core, require_square, SolveCore};
use crate::solver::{IterativeLinearSystemSolver, Solution};
use crate::utils::convergence::Tolerance;
use crate::utils::monitor::IterationMonitor;

#[derive(Debug, Clone)]
pub struct QmrSolver<T> {
    pub opts: SolverOptions<T>,
    /// `M2` of the split `M = M1 M2`.
    pub right_pc: PC<T>,
}

impl<T: Real> QmrSolver<T> {
    pub fn new(tol: T, max_iters: usize) -> Self {
        Self::with_options(SolverOptions::new(tol, max_iters))
    }

    pub fn with_options(opts: SolverOptions<T>) -> Self {
        Self { opts, right_pc: PC::Identity }
    }

    /// Left factor `M1`.
    pub fn with_pc(mut self, pc: PC<T>) -> Self {
        self.opts.pc = pc;
        self
    }

    /// Right factor `M2`.
    pub fn with_right_pc(mut self, pc: PC<T>) -> Self {
        self.right_pc = pc;
        self
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance<T>) -> Self {
        self.opts.tolerance = tolerance;
        self
    }

    /// Accepted for uniformity; QMR recomputes its residual every step.
    pub fn with_refresh_rate(mut self, rate: usize) -> Self {
        self.opts.residual_refresh_rate = rate;
        self
    }
}

impl<M, T> IterativeLinearSystemSolver<M, T> for QmrSolver<T>
where
    M: LinearOperator<T>,
    T: Real,
{
    fn options(&self) -> &SolverOptions<T> {
        &self.opts
    }

    /// `pc` is used as `M1`; `M2` is built from `right_pc`.
    fn solve_with<'a>(
        &self,
        problem: &'a LsProblem<M, T>,
        pc: Box<dyn Preconditioner<M, Vec<T>> + 'a>,
        monitor: Box<dyn IterationMonitor<T> + 'a>,
    ) -> Result<Box<dyn Solution<T> + 'a>, KError> {
        require_square(problem)?;
        let right = self.right_pc.build(problem.a())?;
        let core = SolveCore::new("qmr", problem, &self.opts, usize::MAX, pc, monitor);
        Ok(Box::new(QmrSolution { core, right, state: None }))
    }
}

/// Lanczos and quasi-minimization state between steps.
struct QmrState<T> {
    v_tld: Vec<T>,
    w_tld: Vec<T>,
    y: Vec<T>,
    z: Vec<T>,
    p: Vec<T>,
    q: Vec<T>,
    d: Vec<T>,
    rho: T,
    xi: T,
    gamma: T,
    eta: T,
    theta: T,
    eps: T,
}

struct QmrSolution<'a, M, T> {
    core: SolveCore<'a, M, T>,
    right: Box<dyn Preconditioner<M, Vec<T>>>,
    state: Option<QmrState<T>>,
}

impl<'a, M, T> QmrSolution<'a, M, T>
where
    M: LinearOperator<T>,
    T: Real,
{
    fn right_solve(&self, r: &Vec<T>) -> Result<Vec<T>, KError> {
        let mut z = vec![T::zero(); r.len()];
        self.right.apply(r, &mut z)?;
        Ok(z)
    }

    fn right_solve_t(&self, r: &Vec<T>) -> Result<Vec<T>, KError> {
        let mut z = vec![T::zero(); r.len()];
        self.right.apply_transpose(r, &mut z)?;
        Ok(z)
    }
}

impl<'a, M, T> Solution<T> for QmrSolution<'a, M, T>
where
    M: LinearOperator<T>,
    T: Real,
{
    fn set_initials(&mut self, x0: &[T]) -> Result<(), KError> {
        let ip = ();
        let r = self.core.start(x0)?;
        let y = self.core.precond(&r)?;
        let z = self.right_solve_t(&r)?;
        let n = r.len();
        self.state = Some(QmrState {
            rho: ip.norm(&y),
            xi: ip.norm(&z),
            v_tld: r.clone(),
            w_tld: r,
            y,
            z,
            p: vec![T::zero(); n],
            q: vec![T::zero(); n],
            d: vec![T::zero(); n],
            gamma: T::one(),
            eta: -T::one(),
            theta: T::zero(),
            eps: T::one(),
        });
        Ok(())
    }

    fn step(&mut self) -> Result<(), KError> {
        self.core.begin_step()?;
        let ip = ();
        let mut st = self
            .state
            .take()
            .ok_or(KError::Unsupported("step() called before set_initials()"))?;
        let first = self.core.iterations == 1;

        if st.rho == T::zero() {
            return Err(self.core.breakdown("rho = 0"));
        }
        if st.xi == T::zero() {
            return Err(self.core.breakdown("xi = 0"));
        }
        let v = scaled(T::one() / st.rho, &st.v_tld);
        let y = scaled(T::one() / st.rho, &st.y);
        let w = scaled(T::one() / st.xi, &st.w_tld);
        let z = scaled(T::one() / st.xi, &st.z);
        let delta = ip.dot(&z, &y);
        if delta == T::zero() {
            return Err(self.core.breakdown("delta = 0"));
        }
        let y_tld = self.right_solve(&y)?;
        let z_tld = self.core.precond_t(&z)?;
        if first {
            st.p = y_tld;
            st.q = z_tld;
        } else {
            st.p = lincomb(T::one(), &y_tld, -(st.xi * delta / st.eps), &st.p);
            st.q = lincomb(T::one(), &z_tld, -(st.rho * delta / st.eps), &st.q);
        }
        let p_tld = self.core.matvec(&st.p);
        st.eps = ip.dot(&st.q, &p_tld);
        if st.eps == T::zero() {
            return Err(self.core.breakdown("epsilon = 0"));
        }
        let beta = st.eps / delta;
        if beta == T::zero() {
            return Err(self.core.breakdown("beta = 0"));
        }
        st.v_tld = lincomb(T::one(), &p_tld, -beta, &v);
        st.y = self.core.precond(&st.v_tld)?;
        let rho_old = st.rho;
        st.rho = ip.norm(&st.y);
        st.w_tld = lincomb(T::one(), &self.core.mattransvec(&st.q), -beta, &w);
        st.z = self.right_solve_t(&st.w_tld)?;
        st.xi = ip.norm(&st.z);

        let theta_old = st.theta;
        let gamma_old = st.gamma;
        st.theta = st.rho / (gamma_old * beta.abs());
        st.gamma = T::one() / (T::one() + st.theta * st.theta).sqrt();
        if st.gamma == T::zero() {
            return Err(self.core.breakdown("gamma = 0"));
        }
        st.eta = -st.eta * rho_old * st.gamma * st.gamma / (beta * gamma_old * gamma_old);
        if first {
            st.d = scaled(st.eta, &st.p);
        } else {
            let tg = theta_old * st.gamma;
            st.d = lincomb(st.eta, &st.p, tg * tg, &st.d);
        }
        axpy(T::one(), &st.d, &mut self.core.x);

        let r = self.core.residual();
        self.core.end_step(ip.norm(&r));
        self.state = Some(st);
        Ok(())
    }

    delegate_core!();
}
