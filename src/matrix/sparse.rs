// CSR matrix backed by faer's sparse storage

use faer::sparse::{SparseRowMat, SymbolicSparseRowMat};
use faer::traits::ComplexField;

use crate::core::traits::{MatShape, MatTransVec, MatVec, MatrixGet, Real};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Compressed sparse row matrix.
pub struct CsrMatrix<T> {
    inner: SparseRowMat<usize, T>,
}

impl<T: Real + ComplexField> CsrMatrix<T> {
    /// Build a CSR from raw row‐ptr, col‐idx, and values.
    ///
    /// Column indices within a row must be sorted and unique.
    pub fn from_csr(
        nrows: usize,
        ncols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Self {
        // `None`: row_ptr already describes compressed rows
        let symbolic = SymbolicSparseRowMat::new_checked(nrows, ncols, row_ptr, None, col_idx);
        let inner = SparseRowMat::new(symbolic, values);
        Self { inner }
    }

    /// Build from `(row, col, value)` triplets; duplicates are summed.
    pub fn from_triplets(nrows: usize, ncols: usize, triplets: &[(usize, usize, T)]) -> Self {
        let mut sorted = triplets.to_vec();
        sorted.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        let mut row_ptr = vec![0usize; nrows + 1];
        let mut col_idx: Vec<usize> = Vec::with_capacity(sorted.len());
        let mut values: Vec<T> = Vec::with_capacity(sorted.len());
        let mut last: Option<(usize, usize)> = None;
        for &(i, j, v) in &sorted {
            assert!(i < nrows && j < ncols, "triplet ({i}, {j}) out of bounds");
            if last == Some((i, j)) {
                if let Some(acc) = values.last_mut() {
                    *acc = *acc + v;
                }
                continue;
            }
            col_idx.push(j);
            values.push(v);
            row_ptr[i + 1] += 1;
            last = Some((i, j));
        }
        for i in 0..nrows {
            row_ptr[i + 1] += row_ptr[i];
        }
        Self::from_csr(nrows, ncols, row_ptr, col_idx, values)
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.parts().2.len()
    }

    fn parts(&self) -> (&[usize], &[usize], &[T]) {
        let view = self.inner.as_ref();
        let symbolic = view.symbolic();
        (symbolic.row_ptr(), symbolic.col_idx(), view.val())
    }

    fn row_dot(&self, i: usize, x: &[T]) -> T {
        let (row_ptr, col_idx, val) = self.parts();
        (row_ptr[i]..row_ptr[i + 1]).fold(T::zero(), |acc, k| acc + val[k] * x[col_idx[k]])
    }
}

impl<T: Real + ComplexField> MatShape for CsrMatrix<T> {
    fn nrows(&self) -> usize {
        self.inner.nrows()
    }
    fn ncols(&self) -> usize {
        self.inner.ncols()
    }
}

impl<T: Real + ComplexField> MatVec<Vec<T>> for CsrMatrix<T> {
    fn matvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        assert_eq!(x.len(), MatShape::ncols(self), "Input vector x has incorrect length");
        assert_eq!(y.len(), MatShape::nrows(self), "Output vector y has incorrect length");
        #[cfg(feature = "rayon")]
        y.par_iter_mut().enumerate().for_each(|(i, yi)| *yi = self.row_dot(i, x));
        #[cfg(not(feature = "rayon"))]
        for (i, yi) in y.iter_mut().enumerate() {
            *yi = self.row_dot(i, x);
        }
    }
}

impl<T: Real + ComplexField> MatTransVec<Vec<T>> for CsrMatrix<T> {
    fn mattransvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        assert_eq!(x.len(), MatShape::nrows(self), "Input vector x has incorrect length");
        assert_eq!(y.len(), MatShape::ncols(self), "Output vector y has incorrect length");
        let (row_ptr, col_idx, val) = self.parts();
        y.iter_mut().for_each(|yj| *yj = T::zero());
        // scatter; rows write overlapping columns so this stays serial
        for i in 0..MatShape::nrows(self) {
            for k in row_ptr[i]..row_ptr[i + 1] {
                y[col_idx[k]] = y[col_idx[k]] + val[k] * x[i];
            }
        }
    }
}

impl<T: Real + ComplexField> MatrixGet<T> for CsrMatrix<T> {
    fn get(&self, i: usize, j: usize) -> T {
        let (row_ptr, col_idx, val) = self.parts();
        let (start, end) = (row_ptr[i], row_ptr[i + 1]);
        match col_idx[start..end].binary_search(&j) {
            Ok(k) => val[start + k],
            Err(_) => T::zero(),
        }
    }
}
