//! Command-line or API options for solvers and preconditioners.
//!
//! `SolverOptions` collects everything a Krylov solver is constructed with: the
//! iteration budget, the convergence policy, the (left) preconditioner factory, the
//! residual-refresh cadence and the restart length. `PcOptions` is the string-keyed
//! form of a preconditioner choice, e.g. as parsed from a command line, and converts
//! into a [`PC`].

use crate::context::pc_context::PC;
use crate::core::traits::Real;
use crate::error::KError;
use crate::preconditioner::SorSweep;
use crate::utils::convergence::Tolerance;

/// Default cadence at which incrementally updated residuals are recomputed.
pub const DEFAULT_RESIDUAL_REFRESH_RATE: usize = 50;

/// Construction-time configuration shared by every iterative solver.
#[derive(Debug, Clone)]
pub struct SolverOptions<T> {
    /// Hard cap on the number of steps.
    pub max_iters: usize,
    /// Convergence policy.
    pub tolerance: Tolerance<T>,
    /// Left preconditioner factory.
    pub pc: PC<T>,
    /// Recompute `b − A x` every this many steps (0 disables).
    pub residual_refresh_rate: usize,
    /// Restart length for GMRES/GCR; `None` never restarts within the budget.
    pub restart: Option<usize>,
}

impl<T: Real> SolverOptions<T> {
    /// Absolute tolerance `tol`, identity preconditioner.
    pub fn new(tol: T, max_iters: usize) -> Self {
        Self {
            max_iters,
            tolerance: Tolerance::Absolute(tol),
            pc: PC::Identity,
            residual_refresh_rate: DEFAULT_RESIDUAL_REFRESH_RATE,
            restart: None,
        }
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance<T>) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_pc(mut self, pc: PC<T>) -> Self {
        self.pc = pc;
        self
    }

    pub fn with_refresh_rate(mut self, rate: usize) -> Self {
        self.residual_refresh_rate = rate;
        self
    }

    pub fn with_restart(mut self, restart: usize) -> Self {
        self.restart = Some(restart.max(1));
        self
    }
}

impl Default for SolverOptions<f64> {
    fn default() -> Self {
        Self::new(1e-10, 1000)
    }
}

/// Preconditioner types & parameters.
#[derive(Debug, Clone)]
pub struct PcOptions {
    /// Type of preconditioner (none, jacobi, sor, ssor, ilu0)
    pub pc_type: String,

    /// Relaxation factor ω for SOR/SSOR
    pub omega: f64,
}

impl Default for PcOptions {
    fn default() -> Self {
        Self { pc_type: "none".into(), omega: 1.0 }
    }
}

impl<T: Real> TryFrom<&PcOptions> for PC<T> {
    type Error = KError;

    fn try_from(opts: &PcOptions) -> Result<Self, KError> {
        let omega = T::from_f64(opts.omega)
            .ok_or(KError::Unsupported("relaxation factor not representable"))?;
        match opts.pc_type.to_ascii_lowercase().as_str() {
            "none" | "identity" => Ok(PC::Identity),
            "jacobi" => Ok(PC::Jacobi),
            "sor" => Ok(PC::Sor { omega, sweep: SorSweep::FORWARD }),
            "ssor" => Ok(PC::Ssor { omega }),
            "ilu0" | "ilu" => Ok(PC::Ilu0),
            _ => Err(KError::Unsupported("unknown preconditioner type")),
        }
    }
}
