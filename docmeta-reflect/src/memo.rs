//! Fill-once memo cells

use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A lazily computed value that is computed at most once on success.
///
/// A failed computation leaves the cell empty, so the next access retries.
/// Every attempt is counted.
#[derive(Debug)]
pub struct Memo<T> {
    cell: OnceCell<T>,
    computations: AtomicUsize,
}

impl<T> Memo<T> {
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
            computations: AtomicUsize::new(0),
        }
    }

    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    pub fn get_or_try_init<F, E>(&self, f: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.cell.get_or_try_init(|| {
            self.computations.fetch_add(1, Ordering::Relaxed);
            f()
        })
    }

    /// Number of times the initializer has run.
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::Relaxed)
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Drop the cached value; the computation counter is kept.
    pub fn reset(&mut self) {
        self.cell.take();
    }
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}
