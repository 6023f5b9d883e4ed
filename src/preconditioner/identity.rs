// Identity preconditioner: M = I

use crate::error::KError;
use crate::preconditioner::Preconditioner;

/// Leaves the residual untouched; the default for every solver.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl<M, T: Copy> Preconditioner<M, Vec<T>> for Identity {
    fn apply(&self, r: &Vec<T>, z: &mut Vec<T>) -> Result<(), KError> {
        z.clone_from(r);
        Ok(())
    }

    fn apply_transpose(&self, r: &Vec<T>, z: &mut Vec<T>) -> Result<(), KError> {
        z.clone_from(r);
        Ok(())
    }
}
