//! Givens rotations and the small triangular solve used by the
//! minimal-residual solvers (GMRES keeps its Hessenberg matrix upper
//! triangular by rotating each new column as it arrives).

use std::ops::Range;

use faer::Mat;

use crate::core::traits::Real;
use crate::error::KError;

/// Plane rotation `G = [c s; -s c]` with `G · [a; b] = [r; 0]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GivensRotation<T> {
    pub c: T,
    pub s: T,
}

impl<T: Real> GivensRotation<T> {
    /// Rotation annihilating `b` against `a`, together with `r = ‖(a, b)‖`.
    ///
    /// Returns `None` when `a = b = 0`: the denominator vanishes.
    pub fn new(a: T, b: T) -> Option<(Self, T)> {
        let r = a.hypot(b);
        if r == T::zero() {
            return None;
        }
        Some((Self { c: a / r, s: b / r }, r))
    }

    /// Returns `(c·x + s·y, −s·x + c·y)`.
    #[inline]
    pub fn apply(&self, x: T, y: T) -> (T, T) {
        (self.c * x + self.s * y, -self.s * x + self.c * y)
    }

    /// Rotates rows `i` and `k` of `mat` over the given column range.
    pub fn apply_rows(&self, mat: &mut Mat<T>, i: usize, k: usize, cols: Range<usize>) {
        for j in cols {
            let (top, bottom) = self.apply(mat[(i, j)], mat[(k, j)]);
            mat[(i, j)] = top;
            mat[(k, j)] = bottom;
        }
    }

    /// The rotation embedded in the `n × n` identity, acting on rows `i`, `k`.
    pub fn embedded(&self, n: usize, i: usize, k: usize) -> Mat<T> {
        Mat::from_fn(n, n, |r, c| match (r, c) {
            (r, c) if r == i && c == i => self.c,
            (r, c) if r == i && c == k => self.s,
            (r, c) if r == k && c == i => -self.s,
            (r, c) if r == k && c == k => self.c,
            (r, c) if r == c => T::one(),
            _ => T::zero(),
        })
    }
}

/// Solves the leading `k × k` upper-triangular block of `r` against `rhs[..k]`.
pub fn back_substitute<T: Real>(r: &Mat<T>, rhs: &[T], k: usize) -> Result<Vec<T>, KError> {
    let mut y = rhs[..k].to_vec();
    for i in (0..k).rev() {
        let mut acc = y[i];
        for j in (i + 1)..k {
            acc = acc - r[(i, j)] * y[j];
        }
        let pivot = r[(i, i)];
        if pivot == T::zero() {
            return Err(KError::breakdown(format!("zero pivot R[{i}, {i}] in least-squares solve")));
        }
        y[i] = acc / pivot;
    }
    Ok(y)
}
