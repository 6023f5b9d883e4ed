// Jacobi preconditioner implementation

use crate::core::traits::{MatShape, MatrixGet};
use crate::error::KError;
use crate::preconditioner::Preconditioner;
use num_traits::Float;

/// Jacobi preconditioner: M⁻¹ = D⁻¹
pub struct Jacobi<T> {
    pub(crate) inv_diag: Vec<T>,
}

impl<T: Float> Jacobi<T> {
    /// new with empty state; user must call `setup`.
    pub fn new() -> Self {
        Self { inv_diag: Vec::new() }
    }
}

impl<T: num_traits::Float> Default for Jacobi<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, T> Preconditioner<M, Vec<T>> for Jacobi<T>
where
    M: MatrixGet<T> + MatShape,
    T: Float + Send + Sync,
{
    fn setup(&mut self, a: &M) -> Result<(), KError> {
        let n = a.nrows();
        if a.ncols() != n {
            return Err(KError::IncompatibleDimensions { expected: n, found: a.ncols() });
        }
        let mut inv_diag = Vec::with_capacity(n);
        for i in 0..n {
            let d = a.get(i, i);
            if d == T::zero() {
                return Err(KError::ZeroPivot(i));
            }
            inv_diag.push(T::one() / d);
        }
        self.inv_diag = inv_diag;
        Ok(())
    }

    fn apply(&self, x: &Vec<T>, y: &mut Vec<T>) -> Result<(), KError> {
        if x.len() != self.inv_diag.len() {
            return Err(KError::IncompatibleDimensions { expected: self.inv_diag.len(), found: x.len() });
        }
        y.clear();
        y.extend(x.iter().zip(&self.inv_diag).map(|(&xi, &di)| di * xi));
        Ok(())
    }

    // D is symmetric
    fn apply_transpose(&self, x: &Vec<T>, y: &mut Vec<T>) -> Result<(), KError> {
        <Self as Preconditioner<M, Vec<T>>>::apply(self, x, y)
    }
}
