//! Wrappers for faer dense matrix types and vector operations.
//!
//! This module implements the core linear algebra traits for `faer::Mat`, `faer::MatRef`, and `Vec<T>`,
//! so they can be handed to the generic Krylov solvers and preconditioners. Inner products run on
//! Rayon when the `rayon` feature is enabled.
//!
//! It also hosts the handful of vector kernels the solvers share (`axpy`, `lincomb`, ...). Kernels
//! either return a fresh vector or update a vector the solver owns; caller vectors are only read.
//!
//! # References
//! - [faer crate documentation](https://docs.rs/faer)
//! - [num-traits crate documentation](https://docs.rs/num-traits)

use crate::core::traits::{InnerProduct, MatTransVec, MatVec, Real};
use faer::{Mat, MatRef};
use num_traits::Float;

/// Implements matrix-vector multiplication for `faer::Mat`.
///
/// Computes `y = A * x` where `A` is a dense matrix, `x` and `y` are vectors.
impl<T: Float> MatVec<Vec<T>> for Mat<T> {
    fn matvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        self.as_ref().matvec(x, y)
    }
}

/// Implements matrix-vector multiplication for a matrix reference (`faer::MatRef`).
impl<'a, T: Float> MatVec<Vec<T>> for MatRef<'a, T> {
    fn matvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        assert_eq!(self.nrows(), y.len(), "Output vector y has incorrect length");
        assert_eq!(self.ncols(), x.len(), "Input vector x has incorrect length");
        for i in 0..self.nrows() {
            let mut acc = T::zero();
            for j in 0..self.ncols() {
                acc = acc + self[(i, j)] * x[j];
            }
            y[i] = acc;
        }
    }
}

/// Implements matrix-transpose-vector multiplication for `faer::Mat`.
///
/// Computes `y = A^T * x` where `A` is a dense matrix, `x` and `y` are vectors.
impl<T: Float> MatTransVec<Vec<T>> for Mat<T> {
    fn mattransvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        self.as_ref().mattransvec(x, y)
    }
}

/// Implements matrix-transpose-vector multiplication for a matrix reference (`faer::MatRef`).
impl<'a, T: Float> MatTransVec<Vec<T>> for MatRef<'a, T> {
    fn mattransvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        assert_eq!(self.ncols(), y.len(), "Output vector y has incorrect length");
        assert_eq!(self.nrows(), x.len(), "Input vector x has incorrect length");
        for j in 0..self.ncols() {
            let mut acc = T::zero();
            for i in 0..self.nrows() {
                acc = acc + self[(i, j)] * x[i];
            }
            y[j] = acc;
        }
    }
}

/// Implements inner product and norm for vectors, with optional Rayon parallelism.
///
/// If the `rayon` feature is enabled, uses parallel iterators for performance.
impl<T: Real> InnerProduct<Vec<T>> for () {
    type Scalar = T;
    /// Computes the dot product of two vectors: `x^T y`.
    fn dot(&self, x: &Vec<T>, y: &Vec<T>) -> T {
        assert_eq!(x.len(), y.len(), "Vectors must have the same length");
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            x.as_slice()
                .par_iter()
                .zip(y.as_slice().par_iter())
                .map(|(xi, yi)| *xi * *yi)
                .reduce(|| T::zero(), |acc, v| acc + v)
        }
        #[cfg(not(feature = "rayon"))]
        {
            x.iter()
                .zip(y.iter())
                .map(|(xi, yi)| *xi * *yi)
                .fold(T::zero(), |acc, v| acc + v)
        }
    }
    /// Computes the Euclidean norm of a vector: `||x||_2`.
    fn norm(&self, x: &Vec<T>) -> T {
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            x.as_slice()
                .par_iter()
                .map(|xi| *xi * *xi)
                .reduce(|| T::zero(), |acc, v| acc + v)
                .sqrt()
        }
        #[cfg(not(feature = "rayon"))]
        {
            x.iter()
                .map(|xi| *xi * *xi)
                .fold(T::zero(), |acc, v| acc + v)
                .sqrt()
        }
    }
}

/// y ← y + alpha·x
pub fn axpy<T: Float>(alpha: T, x: &[T], y: &mut [T]) {
    assert_eq!(x.len(), y.len(), "Vectors must have the same length");
    for (yi, &xi) in y.iter_mut().zip(x) {
        *yi = *yi + alpha * xi;
    }
}

/// Returns `a·x + b·y`.
pub fn lincomb<T: Float>(a: T, x: &[T], b: T, y: &[T]) -> Vec<T> {
    assert_eq!(x.len(), y.len(), "Vectors must have the same length");
    x.iter().zip(y).map(|(&xi, &yi)| a * xi + b * yi).collect()
}

/// Returns `alpha·x`.
pub fn scaled<T: Float>(alpha: T, x: &[T]) -> Vec<T> {
    x.iter().map(|&xi| alpha * xi).collect()
}

/// Returns `x − y`.
pub fn sub<T: Float>(x: &[T], y: &[T]) -> Vec<T> {
    lincomb(T::one(), x, -T::one(), y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transpose_product_matches_explicit_transpose() {
        let a = Mat::from_fn(2, 3, |i, j| (i * 3 + j) as f64);
        let x = vec![1.0, -1.0];
        let mut y = vec![0.0; 3];
        a.mattransvec(&x, &mut y);
        assert_eq!(y, vec![-3.0, -3.0, -3.0]);
    }

    #[test]
    fn kernels() {
        let mut y = vec![1.0, 1.0];
        axpy(2.0, &[1.0, 2.0], &mut y);
        assert_eq!(y, vec![3.0, 5.0]);
        assert_eq!(lincomb(1.0, &[1.0, 2.0], 3.0, &[1.0, 0.0]), vec![4.0, 2.0]);
        assert_eq!(scaled(0.5, &[2.0, 4.0]), vec![1.0, 2.0]);
        assert_eq!(sub(&[2.0, 4.0], &[1.0, 1.0]), vec![1.0, 3.0]);
    }
}
