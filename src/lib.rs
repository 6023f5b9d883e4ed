//! kryls: Krylov subspace solvers with a PETSc-style PC/KSP interface over Faer
//!
//! This crate provides preconditioned iterative solvers (CG, Steepest Descent, BiCG,
//! BiCGStab, CGS, CGNE, CGNR, GCR, GMRES, MINRES, QMR) for dense and sparse linear
//! systems. Every solver hands back a stepwise `Solution` that reports each iterate to an
//! `IterationMonitor` and fails with a tagged `ConvergenceFailure` on breakdown or budget
//! exhaustion. Inner products and sparse products run on Rayon with the `rayon` feature.

pub mod config;
pub mod context;
pub mod core;
pub mod error;
pub mod matrix;
pub mod preconditioner;
pub mod solver;
pub mod utils;

// Re-exports for convenience
pub use config::*;
pub use context::*;
pub use crate::core::*;
pub use error::*;
pub use matrix::*;
pub use preconditioner::*;
pub use solver::*;
pub use utils::*;

// Re-export SolveStats at the crate root for convenience
pub use utils::convergence::SolveStats;
