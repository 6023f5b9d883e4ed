//! Observers for the iterates a solver produces.
//!
//! Monitors are purely observational: a solve returns the same vector whether
//! a [`NullMonitor`] or a recording monitor is attached.

/// Receives every iterate: the initial guess, one per completed step, and the
/// final vector returned by `search`.
pub trait IterationMonitor<T> {
    fn add_iterate(&mut self, x: &[T]);
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullMonitor;

impl<T> IterationMonitor<T> for NullMonitor {
    fn add_iterate(&mut self, _x: &[T]) {}
}

/// Keeps a copy of every iterate.
#[derive(Clone, Debug)]
pub struct HistoryMonitor<T> {
    iterates: Vec<Vec<T>>,
}

impl<T> HistoryMonitor<T> {
    pub fn new() -> Self {
        Self { iterates: Vec::new() }
    }

    pub fn iterates(&self) -> &[Vec<T>] {
        &self.iterates
    }

    pub fn len(&self) -> usize {
        self.iterates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.iterates.is_empty()
    }

    pub fn last(&self) -> Option<&Vec<T>> {
        self.iterates.last()
    }

    pub fn clear(&mut self) {
        self.iterates.clear();
    }
}

impl<T> Default for HistoryMonitor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> IterationMonitor<T> for HistoryMonitor<T> {
    fn add_iterate(&mut self, x: &[T]) {
        self.iterates.push(x.to_vec());
    }
}

/// Adapts a closure into a monitor.
pub struct FnMonitor<F>(pub F);

impl<T, F: FnMut(&[T])> IterationMonitor<T> for FnMonitor<F> {
    fn add_iterate(&mut self, x: &[T]) {
        (self.0)(x)
    }
}

impl<T, M: IterationMonitor<T> + ?Sized> IterationMonitor<T> for &mut M {
    fn add_iterate(&mut self, x: &[T]) {
        (**self).add_iterate(x)
    }
}
