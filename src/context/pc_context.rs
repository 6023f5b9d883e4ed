//! Preconditioner context and configuration for Krylov solvers.
//!
//! This module defines the `PC` enum, which provides a unified interface for specifying
//! and configuring all supported preconditioner types in the library. A `PC` value is
//! also the factory every solver uses to build its preconditioner from the coefficient
//! matrix at `solve` time.
//!
//! # Supported Preconditioners
//!
//! - Identity: no preconditioning (the default).
//! - Jacobi: Diagonal scaling preconditioner.
//! - Sor: Successive Over-Relaxation with a chosen sweep.
//! - Ssor: Symmetric Successive Over-Relaxation.
//! - Ilu0: Incomplete LU factorization with zero fill-in.
//!
//! # Example
//!
//! ```rust
//! use kryls::PC;
//! let pc = PC::Ssor { omega: 1.2 };
//! ```

use crate::core::traits::{MatShape, MatrixGet, Real};
use crate::error::KError;
use crate::preconditioner::{Identity, Ilu0, Jacobi, Preconditioner, PreconditionerFactory, Sor, SorSweep};

/// Unified preconditioner enum for all supported types.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PC<T> {
    /// M = I.
    #[default]
    Identity,
    /// Jacobi (diagonal scaling) preconditioner.
    Jacobi,
    /// Successive Over-Relaxation with relaxation `omega` and the given sweep.
    Sor { omega: T, sweep: SorSweep },
    /// Symmetric Successive Over-Relaxation (SSOR) preconditioner.
    Ssor { omega: T },
    /// Incomplete LU factorization with zero fill-in (ILU(0)).
    Ilu0,
}

impl<T: Real> PC<T> {
    /// Uses only `MatrixGet`/`MatShape` of A, so any backend works.
    pub fn build<M>(&self, a: &M) -> Result<Box<dyn Preconditioner<M, Vec<T>>>, KError>
    where
        M: MatrixGet<T> + MatShape,
    {
        let mut pc: Box<dyn Preconditioner<M, Vec<T>>> = match *self {
            PC::Identity => Box::new(Identity),
            PC::Jacobi => Box::new(Jacobi::<T>::new()),
            PC::Sor { omega, sweep } => Box::new(Sor::new(omega, sweep)),
            PC::Ssor { omega } => Box::new(Sor::symmetric(omega)),
            PC::Ilu0 => Box::new(Ilu0::<T>::new()),
        };
        pc.setup(a)?;
        Ok(pc)
    }
}

impl<M, T> PreconditionerFactory<M, Vec<T>> for PC<T>
where
    M: MatrixGet<T> + MatShape,
    T: Real,
{
    fn new_instance(&self, a: &M) -> Result<Box<dyn Preconditioner<M, Vec<T>>>, KError> {
        self.build(a)
    }
}
