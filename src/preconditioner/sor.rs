use std::fmt;

use bitflags::bitflags;
use faer::Mat;
use num_traits::Float;

use crate::core::traits::{MatShape, MatrixGet};
use crate::error::KError;
use crate::preconditioner::{square_entries, Preconditioner};

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct SorSweep: u32 {
        const FORWARD   = 0b01; // M = D/ω + L
        const BACKWARD  = 0b10; // M = D/ω + U
        const SYMMETRIC = Self::FORWARD.bits() | Self::BACKWARD.bits(); // SSOR
    }
}

/// Successive over-relaxation as a preconditioner.
///
/// With [`SorSweep::SYMMETRIC`] this is SSOR:
/// M = ω/(2−ω) · (D/ω + L) D⁻¹ (D/ω + U)
pub struct Sor<T> {
    pub omega: T,
    pub sweep: SorSweep,
    a: Mat<T>,
}

impl<T: Float> Sor<T> {
    pub fn new(omega: T, sweep: SorSweep) -> Self {
        Self { omega, sweep, a: Mat::from_fn(0, 0, |_, _| T::zero()) }
    }

    /// SSOR with relaxation `omega`.
    pub fn symmetric(omega: T) -> Self {
        Self::new(omega, SorSweep::SYMMETRIC)
    }

    fn n(&self) -> usize {
        self.a.nrows()
    }

    // (D/ω + strict lower part of E) z = r, E given entrywise
    fn lower_solve(&self, r: &[T], e: impl Fn(usize, usize) -> T) -> Vec<T> {
        let n = self.n();
        let mut z = vec![T::zero(); n];
        for i in 0..n {
            let mut acc = r[i];
            for j in 0..i {
                acc = acc - e(i, j) * z[j];
            }
            z[i] = acc * self.omega / self.a[(i, i)];
        }
        z
    }

    // (D/ω + strict upper part of E) z = r
    fn upper_solve(&self, r: &[T], e: impl Fn(usize, usize) -> T) -> Vec<T> {
        let n = self.n();
        let mut z = vec![T::zero(); n];
        for i in (0..n).rev() {
            let mut acc = r[i];
            for j in (i + 1)..n {
                acc = acc - e(i, j) * z[j];
            }
            z[i] = acc * self.omega / self.a[(i, i)];
        }
        z
    }

    fn sweep_solve(&self, r: &[T], e: impl Fn(usize, usize) -> T + Copy, transpose: bool) -> Vec<T> {
        let forward = self.sweep.contains(SorSweep::FORWARD);
        let backward = self.sweep.contains(SorSweep::BACKWARD);
        match (forward, backward, transpose) {
            (true, true, _) => {
                let two = T::one() + T::one();
                let scale = (two - self.omega) / self.omega;
                let mut y = self.lower_solve(r, e);
                for (i, yi) in y.iter_mut().enumerate() {
                    *yi = *yi * self.a[(i, i)] * scale;
                }
                self.upper_solve(&y, e)
            }
            // (D/ω + L)ᵀ is upper triangular and vice versa
            (true, false, false) | (false, true, true) => self.lower_solve(r, e),
            _ => self.upper_solve(r, e),
        }
    }
}

impl<T: Float + fmt::Display> fmt::Display for Sor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SOR(omega={}, sweep={:?})", self.omega, self.sweep)
    }
}

impl<M, T> Preconditioner<M, Vec<T>> for Sor<T>
where
    M: MatrixGet<T> + MatShape,
    T: Float,
{
    fn setup(&mut self, a: &M) -> Result<(), KError> {
        let two = T::one() + T::one();
        if !(self.omega > T::zero() && self.omega < two) {
            return Err(KError::FactorError("SOR relaxation factor must lie in (0, 2)".into()));
        }
        if self.sweep.is_empty() {
            return Err(KError::Unsupported("SOR without a sweep direction"));
        }
        let a = square_entries(a)?;
        if let Some(i) = (0..a.nrows()).find(|&i| a[(i, i)] == T::zero()) {
            return Err(KError::ZeroPivot(i));
        }
        self.a = a;
        Ok(())
    }

    fn apply(&self, r: &Vec<T>, z: &mut Vec<T>) -> Result<(), KError> {
        if r.len() != self.n() {
            return Err(KError::IncompatibleDimensions { expected: self.n(), found: r.len() });
        }
        *z = self.sweep_solve(r, |i, j| self.a[(i, j)], false);
        Ok(())
    }

    fn apply_transpose(&self, r: &Vec<T>, z: &mut Vec<T>) -> Result<(), KError> {
        if r.len() != self.n() {
            return Err(KError::IncompatibleDimensions { expected: self.n(), found: r.len() });
        }
        *z = self.sweep_solve(r, |i, j| self.a[(j, i)], true);
        Ok(())
    }
}
