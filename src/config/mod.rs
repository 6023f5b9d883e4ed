//! Solver and preconditioner configuration.

pub mod options;
pub use options::{PcOptions, SolverOptions, DEFAULT_RESIDUAL_REFRESH_RATE};
