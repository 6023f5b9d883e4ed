//! Dense‐matrix API on top of Faer.
//!
//! This module provides the `DenseMatrix` trait and its implementation for the `faer::Mat<T>` type,
//! enabling construction from raw column-major storage.

use crate::core::traits::{MatShape, MatVec, MatrixGet};
use faer::Mat;

impl<T: Copy + num_traits::Float> MatrixGet<T> for Mat<T> {
    fn get(&self, i: usize, j: usize) -> T {
        self[(i, j)]
    }
}

/// Blanket impl so any Faer Mat<T> is a DenseMatrix.
pub trait DenseMatrix<T>: MatVec<Vec<T>> + MatShape {
    /// Construct from raw column-major storage.
    fn from_raw(nrows: usize, ncols: usize, data: Vec<T>) -> Self;

    /// Construct from a slice of rows.
    fn from_rows(rows: &[Vec<T>]) -> Self;
}

impl<T: Copy + num_traits::Float> DenseMatrix<T> for Mat<T> {
    fn from_raw(nrows: usize, ncols: usize, data: Vec<T>) -> Self {
        assert_eq!(data.len(), nrows * ncols, "raw storage has incorrect length");
        Mat::from_fn(nrows, ncols, |i, j| data[j * nrows + i])
    }

    fn from_rows(rows: &[Vec<T>]) -> Self {
        let ncols = rows.first().map_or(0, Vec::len);
        assert!(rows.iter().all(|r| r.len() == ncols), "ragged rows");
        Mat::from_fn(rows.len(), ncols, |i, j| rows[i][j])
    }
}

impl<T> MatShape for Mat<T> {
    fn nrows(&self) -> usize {
        self.nrows()
    }
    fn ncols(&self) -> usize {
        self.ncols()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_storage_is_column_major() {
        let a: Mat<f64> = DenseMatrix::from_raw(2, 2, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(*a.get(0, 1), 3.0);
        assert_eq!(*a.get(1, 0), 2.0);
    }

    #[test]
    fn rows_round_trip_through_get() {
        let a: Mat<f64> = DenseMatrix::from_rows(&[vec![4.0, 1.0], vec![1.0, 3.0]]);
        assert_eq!(MatShape::nrows(&a), 2);
        assert_eq!(*a.get(0, 1), 1.0);
    }
}
