//! ILU(0) factorization with zero fill (Saad §10.3).
//!
//! L (unit lower) and U are stored together in one matrix and only
//! positions that are nonzero in A are ever written.

use crate::core::traits::{MatShape, MatrixGet};
use crate::error::KError;
use crate::preconditioner::{square_entries, Preconditioner};
use faer::Mat;
use num_traits::Float;

pub struct Ilu0<T> {
    pub(crate) lu: Mat<T>,
}

impl<T: Float> Ilu0<T> {
    pub fn new() -> Self {
        Self { lu: Mat::from_fn(0, 0, |_, _| T::zero()) }
    }

    fn n(&self) -> usize {
        self.lu.nrows()
    }

    fn check_len(&self, len: usize) -> Result<(), KError> {
        if len != self.n() {
            return Err(KError::IncompatibleDimensions { expected: self.n(), found: len });
        }
        Ok(())
    }
}

impl<T: Float> Default for Ilu0<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, T> Preconditioner<M, Vec<T>> for Ilu0<T>
where
    M: MatrixGet<T> + MatShape,
    T: Float,
{
    fn setup(&mut self, a: &M) -> Result<(), KError> {
        let pattern = square_entries(a)?;
        let mut lu = pattern.clone();
        let n = lu.nrows();
        // IKJ variant restricted to the pattern of A
        for i in 1..n {
            for k in 0..i {
                if pattern[(i, k)] == T::zero() {
                    continue;
                }
                let pivot = lu[(k, k)];
                if pivot == T::zero() {
                    return Err(KError::ZeroPivot(k));
                }
                let lik = lu[(i, k)] / pivot;
                lu[(i, k)] = lik;
                for j in (k + 1)..n {
                    if pattern[(i, j)] != T::zero() {
                        lu[(i, j)] = lu[(i, j)] - lik * lu[(k, j)];
                    }
                }
            }
        }
        if let Some(i) = (0..n).find(|&i| lu[(i, i)] == T::zero()) {
            return Err(KError::ZeroPivot(i));
        }
        self.lu = lu;
        Ok(())
    }

    fn apply(&self, x: &Vec<T>, y: &mut Vec<T>) -> Result<(), KError> {
        self.check_len(x.len())?;
        let n = self.n();
        // solve L y1 = x
        let mut y1 = x.clone();
        for i in 0..n {
            for j in 0..i {
                y1[i] = y1[i] - self.lu[(i, j)] * y1[j];
            }
        }
        // solve U y = y1
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                y1[i] = y1[i] - self.lu[(i, j)] * y1[j];
            }
            y1[i] = y1[i] / self.lu[(i, i)];
        }
        *y = y1;
        Ok(())
    }

    fn apply_transpose(&self, x: &Vec<T>, y: &mut Vec<T>) -> Result<(), KError> {
        self.check_len(x.len())?;
        let n = self.n();
        // (LU)ᵀ = Uᵀ Lᵀ: solve Uᵀ y1 = x (lower), then Lᵀ y = y1 (unit upper)
        let mut y1 = x.clone();
        for i in 0..n {
            for j in 0..i {
                y1[i] = y1[i] - self.lu[(j, i)] * y1[j];
            }
            y1[i] = y1[i] / self.lu[(i, i)];
        }
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                y1[i] = y1[i] - self.lu[(j, i)] * y1[j];
            }
        }
        *y = y1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::MatVec;
    use approx::assert_abs_diff_eq;

    #[test]
    fn exact_on_tridiagonal() {
        // no fill-in occurs for a tridiagonal A, so ILU(0) is the exact LU
        let n = 5;
        let a = Mat::from_fn(n, n, |i, j| match i as isize - j as isize {
            0 => 3.0,
            -1 => -1.0,
            1 => -0.5,
            _ => 0.0,
        });
        let mut pc = Ilu0::<f64>::new();
        Preconditioner::<Mat<f64>, Vec<f64>>::setup(&mut pc, &a).unwrap();
        let x_true = vec![1.0, -2.0, 0.5, 3.0, 1.0];
        let mut b = vec![0.0; n];
        a.matvec(&x_true, &mut b);
        let mut z = vec![0.0; n];
        Preconditioner::<Mat<f64>, _>::apply(&pc, &b, &mut z).unwrap();
        for i in 0..n {
            assert_abs_diff_eq!(z[i], x_true[i], epsilon = 1e-12);
        }
        // and the transpose solve inverts Aᵀ
        let mut bt = vec![0.0; n];
        crate::core::traits::MatTransVec::mattransvec(&a, &x_true, &mut bt);
        Preconditioner::<Mat<f64>, _>::apply_transpose(&pc, &bt, &mut z).unwrap();
        for i in 0..n {
            assert_abs_diff_eq!(z[i], x_true[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn zero_leading_pivot_fails() {
        let a = Mat::from_fn(2, 2, |i, j| if i == j { 0.0 } else { 1.0 });
        let mut pc = Ilu0::<f64>::new();
        let err = Preconditioner::<Mat<f64>, Vec<f64>>::setup(&mut pc, &a).unwrap_err();
        assert!(matches!(err, KError::ZeroPivot(0)));
    }
}
