//! Context module for the kryls linear algebra library.
//!
//! This module provides context/factory types for configuring and managing solver and preconditioner objects.
//! Contexts encapsulate algorithm selection, parameter management, and construction of solver/preconditioner pipelines.
//!
//! Modules:
//! - [`ksp_context`]: Contains the `KspContext` struct for Krylov subspace solver configuration and management.
//! - [`pc_context`]: Contains the `PC` preconditioner selector, which doubles as the preconditioner factory.
//!
//! # Example
//! ```rust
//! use kryls::{KspContext, LsProblem, PC, SolverKind};
//! use faer::Mat;
//!
//! let a: Mat<f64> = Mat::from_fn(2, 2, |i, j| [[4.0, 1.0], [1.0, 3.0]][i][j]);
//! let problem = LsProblem::new(a, vec![1.0, 2.0]).unwrap();
//! let ksp = KspContext::new("cg".parse::<SolverKind>().unwrap(), 1e-10, 10).with_pc(PC::Jacobi);
//! let (x, stats) = ksp.solve_context(&problem, &[0.0, 0.0]).unwrap();
//! assert!(stats.converged);
//! assert!((x[0] - 1.0 / 11.0).abs() < 1e-8);
//! ```
//!
//! # References
//! - Saad, Y. (2003). Iterative Methods for Sparse Linear Systems. SIAM.
//! - PETSc documentation: https://petsc.org/release/docs/manualpages/KSP/

pub mod ksp_context;
pub use ksp_context::{KspContext, SolverKind};
pub mod pc_context;
