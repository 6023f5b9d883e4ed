//! Backend traits, faer wrappers and the problem type.

pub mod problem;
pub mod traits;
pub mod wrappers;

pub use problem::LsProblem;
pub use traits::{InnerProduct, LinearOperator, MatShape, MatTransVec, MatVec, MatrixGet, Real};
