//! Preconditioned MINRES (Paige & Saunders 1975) for symmetric, possibly
//! indefinite or singular `A`.
//!
//! The Lanczos three-term recurrence replaces Arnoldi, and the QR factors of
//! the tridiagonal matrix are updated with one rotation per step, so `x` moves
//! along a short-recurrence direction `w` without storing the basis. The
//! preconditioner must be symmetric positive definite. The tolerance is
//! tested on the rotated residual estimate `phibar`, and a passing estimate
//! is confirmed against the true residual before the solve stops.

use crate::config::SolverOptions;
use crate::core::traits::{InnerProduct, LinearOperator, Real};
use crate::core::wrappers::{axpy, lincomb, scaled};
use crate::core::LsProblem;
use crate::error::KError;
use crate::preconditioner::Preconditioner;
use crate::solver::state::{delegate_core, require_square, SolveCore};
use crate::solver::{IterativeLinearSystemSolver, Solution};
use crate::utils::monitor::IterationMonitor;

#[derive(Debug, Clone)]
pub struct MinresSolver<T> {
    pub opts: SolverOptions<T>,
}

option_builders!(MinresSolver);

impl<M, T> IterativeLinearSystemSolver<M, T> for MinresSolver<T>
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
        let core = SolveCore::new("minres", problem, &self.opts, usize::MAX, pc, monitor);
        Ok(Box::new(MinresSolution {
            core,
            lanczos: Lanczos::new(T::zero(), Vec::new()),
            qr: RollingQr::new(T::zero(), 0),
        }))
    }
}

/// Preconditioned Lanczos vectors: `r1`, `r2` are the last two residual-like
/// vectors, `y = M⁻¹ r2`.
struct Lanczos<T> {
    r1: Vec<T>,
    r2: Vec<T>,
    y: Vec<T>,
    beta: T,
    old_beta: T,
}

/// Rolling QR factorization of the Lanczos tridiagonal matrix.
struct RollingQr<T> {
    cs: T,
    sn: T,
    dbar: T,
    epsln: T,
    phibar: T,
    w: Vec<T>,
    w1: Vec<T>,
    w2: Vec<T>,
}

impl<T: Real> Lanczos<T> {
    /// Starts from `r1 = r2 = r0`, `y = M⁻¹ r0`, `β = β1`.
    fn new(beta1: T, r0: Vec<T>) -> Self {
        Self { r1: r0.clone(), r2: r0, y: Vec::new(), beta: beta1, old_beta: T::zero() }
    }
}

impl<T: Real> RollingQr<T> {
    fn new(phibar: T, n: usize) -> Self {
        Self {
            cs: -T::one(),
            sn: T::zero(),
            dbar: T::zero(),
            epsln: T::zero(),
            phibar,
            w: vec![T::zero(); n],
            w1: vec![T::zero(); n],
            w2: vec![T::zero(); n],
        }
    }
}

struct MinresSolution<'a, M, T> {
    core: SolveCore<'a, M, T>,
    lanczos: Lanczos<T>,
    qr: RollingQr<T>,
}

impl<'a, M, T> MinresSolution<'a, M, T>
where
    M: LinearOperator<T>,
    T: Real,
{
    /// sqrt(<r, M⁻¹ r>), rejecting an indefinite preconditioner.
    fn m_norm(&self, r: &Vec<T>, y: &Vec<T>) -> Result<T, KError> {
        let ip = ();
        let rr = ip.dot(r, y);
        if rr < T::zero() {
            return Err(KError::IndefinitePreconditioner);
        }
        Ok(rr.sqrt())
    }
}

impl<'a, M, T> Solution<T> for MinresSolution<'a, M, T>
where
    M: LinearOperator<T>,
    T: Real,
{
    fn set_initials(&mut self, x0: &[T]) -> Result<(), KError> {
        let r = self.core.start(x0)?;
        let y = self.core.precond(&r)?;
        let beta1 = self.m_norm(&r, &y)?;
        if beta1 == T::zero() {
            // x0 is exact
            self.core.converged = true;
        }
        self.qr = RollingQr::new(beta1, r.len());
        self.lanczos = Lanczos { y, ..Lanczos::new(beta1, r) };
        Ok(())
    }

    fn step(&mut self) -> Result<(), KError> {
        self.core.begin_step()?;
        let ip = ();
        let lz = &mut self.lanczos;

        // Lanczos: v = y / β, y = A v − (β/β_old) r1 − (α/β) r2
        let beta = lz.beta;
        let v = scaled(T::one() / beta, &lz.y);
        let mut y = self.core.matvec(&v);
        if self.core.iterations >= 2 {
            axpy(-beta / lz.old_beta, &lz.r1, &mut y);
        }
        let alpha = ip.dot(&v, &y);
        axpy(-alpha / beta, &lz.r2, &mut y);
        lz.r1 = std::mem::replace(&mut lz.r2, y);
        lz.y = self.core.precond(&lz.r2)?;
        lz.old_beta = beta;
        let rr = ip.dot(&lz.r2, &lz.y);
        if rr < T::zero() {
            return Err(KError::IndefinitePreconditioner);
        }
        lz.beta = rr.sqrt();
        let beta_next = lz.beta;

        // apply the previous rotation, then build the next one
        let qr = &mut self.qr;
        let old_eps = qr.epsln;
        let delta = qr.cs * qr.dbar + qr.sn * alpha;
        let gbar = qr.sn * qr.dbar - qr.cs * alpha;
        qr.epsln = qr.sn * beta_next;
        qr.dbar = -qr.cs * beta_next;
        let gamma = gbar.hypot(beta_next);
        if gamma == T::zero() {
            return Err(self.core.breakdown("gamma = 0"));
        }
        qr.cs = gbar / gamma;
        qr.sn = beta_next / gamma;
        let phi = qr.cs * qr.phibar;
        qr.phibar = qr.sn * qr.phibar;

        // w = (v − ε_old w1 − δ w2) / γ
        qr.w1 = std::mem::replace(&mut qr.w2, std::mem::take(&mut qr.w));
        let mut w = lincomb(T::one(), &v, -old_eps, &qr.w1);
        axpy(-delta, &qr.w2, &mut w);
        qr.w = scaled(T::one() / gamma, &w);
        axpy(phi, &qr.w, &mut self.core.x);

        let phibar = qr.phibar;
        self.core.end_step(phibar);
        // phibar drifts from ‖b − A x‖ once the Lanczos basis loses orthogonality
        self.core.confirm_converged();
        if !self.core.converged && beta_next == T::zero() {
            return Err(self.core.breakdown("Lanczos beta = 0"));
        }
        Ok(())
    }

    delegate_core!();
}
