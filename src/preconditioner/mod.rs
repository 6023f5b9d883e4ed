//! Preconditioners for linear solvers.
//!
//! This module defines the Preconditioner trait, the factory that builds one from a
//! coefficient matrix, and the identity, Jacobi, SOR/SSOR and ILU(0) implementations.

use faer::Mat;

use crate::core::traits::{MatShape, MatrixGet};
use crate::error::KError;

/// A preconditioner M ≈ A.
pub trait Preconditioner<M, V> {
    /// Apply M⁻¹ to r, writing z = M⁻¹ r
    fn apply(&self, r: &V, z: &mut V) -> Result<(), KError>;
    /// Apply M⁻ᵀ to r, writing z = M⁻ᵀ r
    fn apply_transpose(&self, r: &V, z: &mut V) -> Result<(), KError>;
    /// Optionally: setup/factorize from A
    fn setup(&mut self, _a: &M) -> Result<(), KError> { Ok(()) }
}

/// Builds a ready-to-use preconditioner for a given coefficient matrix.
pub trait PreconditionerFactory<M, V> {
    fn new_instance(&self, a: &M) -> Result<Box<dyn Preconditioner<M, V>>, KError>;
}

/// Dense copy of a square A, for the factorizing preconditioners.
pub(crate) fn square_entries<T, M>(a: &M) -> Result<Mat<T>, KError>
where
    M: MatrixGet<T> + MatShape,
{
    let n = a.nrows();
    if a.ncols() != n {
        return Err(KError::IncompatibleDimensions { expected: n, found: a.ncols() });
    }
    Ok(Mat::from_fn(n, n, |i, j| a.get(i, j)))
}

// Submodules for various preconditioners
pub mod identity;
pub mod ilu;
pub mod jacobi;
pub mod sor;

// Re-exports for convenience
pub use identity::Identity;
pub use ilu::Ilu0;
pub use jacobi::Jacobi;
pub use sor::{Sor, SorSweep};

/// Unified preconditioner enum for all supported types.
pub use crate::context::pc_context::PC;
