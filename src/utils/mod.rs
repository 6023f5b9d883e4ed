//! Stopping criteria, iterate monitors and Givens-rotation helpers.

pub mod convergence;
pub mod givens;
pub mod monitor;

pub use convergence::{SolveStats, Tolerance};
pub use givens::{back_substitute, GivensRotation};
pub use monitor::{FnMonitor, HistoryMonitor, IterationMonitor, NullMonitor};
