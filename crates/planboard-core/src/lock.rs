//! Mutex helpers that recover from lock poisoning.

use std::sync::{Mutex, MutexGuard};

/// Extension trait for [`Mutex`] that recovers from poisoning.
///
/// A poisoned lock means some task panicked while holding the guard. The
/// board state behind these locks is always left internally consistent
/// between statements, so the guard is still usable; the panic itself is
/// the error worth reporting, not the poison flag.
pub trait RecoverLock<T> {
    /// Lock the mutex, recovering the guard if the lock is poisoned.
    fn lock_recover(&self) -> MutexGuard<'_, T>;
}

impl<T> RecoverLock<T> for Mutex<T> {
    fn lock_recover(&self) -> MutexGuard<'_, T> {
        match self.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
