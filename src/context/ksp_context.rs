//! Factory for Krylov Subspace Methods (KSP).
//!
//! This module provides the `KspContext` struct, which holds a solver kind and its
//! options and turns them into a solver object. It allows users to select a solver
//! kind at run time (e.g. from a string option), configure solver parameters, and
//! solve linear systems in a unified way.
//!
//! # Usage
//!
//! 1. Construct a `KspContext` with the desired solver kind, tolerance, and iteration limit.
//! 2. Optionally pick preconditioners, a restart length or a residual refresh rate.
//! 3. Call `solve_context` to solve a linear system `Ax = b`, or `build` to get the solver.
//!
//! # Supported Solvers
//! - CG, Steepest Descent, BiCG, BiCGStab, CGS, CGNE, CGNR, GCR, GMRES, MINRES, QMR
//!
//! # References
//! - Saad, Y. (2003). Iterative Methods for Sparse Linear Systems. SIAM.
//! - Templates for the Solution of Linear Systems: Building Blocks for Iterative Methods, 2nd Edition (Barrett et al.)

use std::fmt;
use std::str::FromStr;

use crate::config::SolverOptions;
use crate::context::pc_context::PC;
use crate::core::traits::{LinearOperator, Real};
use crate::core::LsProblem;
use crate::error::KError;
use crate::solver::{
    BiCgSolver, BiCgStabSolver, CgSolver, CgneSolver, CgnrSolver, CgsSolver, GcrSolver, GmresSolver,
    IterativeLinearSystemSolver, MinresSolver, QmrSolver, SteepestDescentSolver,
};
use crate::utils::convergence::{SolveStats, Tolerance};

/// Enum representing the available Krylov solver types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverKind {
    /// Conjugate Gradient (CG) method (for SPD matrices)
    Cg,
    /// Steepest Descent
    SteepestDescent,
    /// BiConjugate Gradient (BiCG)
    Bicg,
    /// BiConjugate Gradient Stabilized (BiCGStab)
    Bicgstab,
    /// Conjugate Gradient Squared (CGS)
    Cgs,
    /// Conjugate Gradient on the Normal Equations of the error (CGNE)
    Cgne,
    /// Conjugate Gradient on the Normal Equations of the residual (CGNR)
    Cgnr,
    /// Generalized Conjugate Residual (GCR)
    Gcr,
    /// Generalized Minimal Residual (GMRES)
    Gmres,
    /// Minimal Residual (MINRES)
    Minres,
    /// Quasi-Minimal Residual (QMR)
    Qmr,
}

impl SolverKind {
    pub const ALL: [SolverKind; 11] = [
        SolverKind::Cg,
        SolverKind::SteepestDescent,
        SolverKind::Bicg,
        SolverKind::Bicgstab,
        SolverKind::Cgs,
        SolverKind::Cgne,
        SolverKind::Cgnr,
        SolverKind::Gcr,
        SolverKind::Gmres,
        SolverKind::Minres,
        SolverKind::Qmr,
    ];

    /// Short option name, as accepted by `FromStr`.
    pub fn name(&self) -> &'static str {
        match self {
            SolverKind::Cg => "cg",
            SolverKind::SteepestDescent => "sd",
            SolverKind::Bicg => "bicg",
            SolverKind::Bicgstab => "bicgstab",
            SolverKind::Cgs => "cgs",
            SolverKind::Cgne => "cgne",
            SolverKind::Cgnr => "cgnr",
            SolverKind::Gcr => "gcr",
            SolverKind::Gmres => "gmres",
            SolverKind::Minres => "minres",
            SolverKind::Qmr => "qmr",
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SolverKind {
    type Err = KError;

    fn from_str(s: &str) -> Result<Self, KError> {
        let s = s.trim().to_ascii_lowercase();
        SolverKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .or(match s.as_str() {
                "steepest" | "steepest-descent" => Some(SolverKind::SteepestDescent),
                _ => None,
            })
            .ok_or(KError::Unsupported("unknown solver type"))
    }
}

/// Context and configuration for a Krylov subspace solver.
///
/// Holds the solver kind and its options; the matrix is supplied per solve.
#[derive(Debug, Clone)]
pub struct KspContext<T> {
    /// The type of Krylov solver to use
    pub kind: SolverKind,
    /// Budget, tolerance, left preconditioner, refresh rate, restart
    pub opts: SolverOptions<T>,
    /// Right factor of the split preconditioner (QMR only)
    pub right_pc: PC<T>,
}

impl<T: Real> KspContext<T> {
    pub fn new(kind: SolverKind, tol: T, max_iters: usize) -> Self {
        Self::with_options(kind, SolverOptions::new(tol, max_iters))
    }

    pub fn with_options(kind: SolverKind, opts: SolverOptions<T>) -> Self {
        Self { kind, opts, right_pc: PC::Identity }
    }

    pub fn with_pc(mut self, pc: PC<T>) -> Self {
        self.opts.pc = pc;
        self
    }

    pub fn with_right_pc(mut self, pc: PC<T>) -> Self {
        self.right_pc = pc;
        self
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance<T>) -> Self {
        self.opts.tolerance = tolerance;
        self
    }

    pub fn with_refresh_rate(mut self, rate: usize) -> Self {
        self.opts.residual_refresh_rate = rate;
        self
    }

    /// Restart length; only GMRES and GCR use it.
    pub fn with_restart(mut self, m: usize) -> Self {
        self.opts = self.opts.with_restart(m);
        self
    }

    /// Instantiates the configured solver for matrices of type `M`.
    pub fn build<M>(&self) -> Box<dyn IterativeLinearSystemSolver<M, T>>
    where
        M: LinearOperator<T>,
    {
        let opts = self.opts.clone();
        match self.kind {
            SolverKind::Cg => Box::new(CgSolver::with_options(opts)),
            SolverKind::SteepestDescent => Box::new(SteepestDescentSolver::with_options(opts)),
            SolverKind::Bicg => Box::new(BiCgSolver::with_options(opts)),
            SolverKind::Bicgstab => Box::new(BiCgStabSolver::with_options(opts)),
            SolverKind::Cgs => Box::new(CgsSolver::with_options(opts)),
            SolverKind::Cgne => Box::new(CgneSolver::with_options(opts)),
            SolverKind::Cgnr => Box::new(CgnrSolver::with_options(opts)),
            SolverKind::Gcr => Box::new(GcrSolver::with_options(opts)),
            SolverKind::Gmres => Box::new(GmresSolver::with_options(opts)),
            SolverKind::Minres => Box::new(MinresSolver::with_options(opts)),
            SolverKind::Qmr => Box::new(QmrSolver::with_options(opts).with_right_pc(self.right_pc)),
        }
    }

    /// Solve `Ax = b` from `x0` with the configured solver and preconditioner.
    ///
    /// # Returns
    /// * `Ok((x, stats))` on convergence
    /// * `Err(KError)` on breakdown, budget exhaustion or a setup failure
    pub fn solve_context<M>(&self, problem: &LsProblem<M, T>, x0: &[T]) -> Result<(Vec<T>, SolveStats<T>), KError>
    where
        M: LinearOperator<T>,
    {
        let solver = self.build::<M>();
        let mut sol = solver.solve(problem)?;
        let x = sol.search(x0)?;
        Ok((x, sol.stats()))
    }
}
