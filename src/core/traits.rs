//! Core linear-algebra traits for kryls.

use std::fmt::{Debug, LowerExp};

use num_traits::{Float, FromPrimitive};

/// Real scalar the solvers operate on (`f32`, `f64`).
pub trait Real: Float + FromPrimitive + Debug + LowerExp + Send + Sync + 'static {}

impl<T> Real for T where T: Float + FromPrimitive + Debug + LowerExp + Send + Sync + 'static {}

/// Matrix–vector product: y ← A x.
pub trait MatVec<V> {
    /// Compute y = A · x.
    fn matvec(&self, x: &V, y: &mut V);
}

/// Matrix-transpose–vector product: y ← Aᵀ x.
pub trait MatTransVec<V> {
    /// Compute y = Aᵀ · x.
    fn mattransvec(&self, x: &V, y: &mut V);
}

/// Inner products & norms.
pub trait InnerProduct<V> {
    /// Associated scalar type.
    type Scalar: Copy + PartialOrd;
    /// Compute dot(x, y).
    fn dot(&self, x: &V, y: &V) -> Self::Scalar;
    /// Compute ‖x‖₂.
    fn norm(&self, x: &V) -> Self::Scalar;
}

/// Row/column counts of an operator.
pub trait MatShape {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
}

/// Entry access, used when a preconditioner is built from A.
pub trait MatrixGet<T> {
    fn get(&self, i: usize, j: usize) -> T;
}

/// Everything a solver and the built-in preconditioners need from A.
pub trait LinearOperator<T>:
    MatVec<Vec<T>> + MatTransVec<Vec<T>> + MatShape + MatrixGet<T>
{
}

impl<T, M> LinearOperator<T> for M where
    M: MatVec<Vec<T>> + MatTransVec<Vec<T>> + MatShape + MatrixGet<T>
{
}
