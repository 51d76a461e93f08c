//! Scoped handling of the thunk lock.
//!
//! Native creation calls run with the lock fully released; calls into narrow code run with one
//! extra level held. Both guards undo their change on drop, so early returns and unwinding leave
//! the lock as they found it.

use log::trace;

use crate::host::ThunkLock;

/// Releases every recursion level of the thunk lock until dropped.
#[must_use = "the lock is restored as soon as the guard is dropped"]
pub struct ReleasedThunkLock<'a, L: ThunkLock + ?Sized> {
    lock: &'a L,
    count: u32,
}

impl<'a, L: ThunkLock + ?Sized> ReleasedThunkLock<'a, L> {
    pub fn new(lock: &'a L) -> Self {
        let count = lock.release_all();
        trace!("released {count} thunk lock level(s)");
        ReleasedThunkLock { lock, count }
    }

    /// Number of levels that will be re-acquired on drop.
    pub fn count(&self) -> u32 {
        self.count
    }
}

impl<L: ThunkLock + ?Sized> Drop for ReleasedThunkLock<'_, L> {
    fn drop(&mut self) {
        self.lock.restore(self.count);
    }
}

/// Holds one level of the thunk lock until dropped.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct HeldThunkLock<'a, L: ThunkLock + ?Sized> {
    lock: &'a L,
}

impl<'a, L: ThunkLock + ?Sized> HeldThunkLock<'a, L> {
    pub fn new(lock: &'a L) -> Self {
        lock.acquire();
        HeldThunkLock { lock }
    }
}

impl<L: ThunkLock + ?Sized> Drop for HeldThunkLock<'_, L> {
    fn drop(&mut self) {
        self.lock.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    #[derive(Default)]
    struct CountingLock {
        depth: Cell<u32>,
    }

    impl ThunkLock for CountingLock {
        fn release_all(&self) -> u32 {
            self.depth.replace(0)
        }

        fn restore(&self, count: u32) {
            self.depth.set(self.depth.get() + count);
        }

        fn acquire(&self) {
            self.depth.set(self.depth.get() + 1);
        }

        fn release(&self) {
            self.depth.set(self.depth.get() - 1);
        }
    }

    #[test]
    fn released_lock_is_restored() {
        let lock = CountingLock::default();
        lock.depth.set(3);

        {
            let guard = ReleasedThunkLock::new(&lock);
            assert_eq!(guard.count(), 3);
            assert_eq!(lock.depth.get(), 0);

            let _inner = HeldThunkLock::new(&lock);
            assert_eq!(lock.depth.get(), 1);
        }

        assert_eq!(lock.depth.get(), 3);
    }

    #[test]
    fn guards_unwind_cleanly() {
        let lock = CountingLock::default();
        lock.depth.set(1);

        let result = catch_unwind(AssertUnwindSafe(|| {
            let _held = HeldThunkLock::new(&lock);
            let _released = ReleasedThunkLock::new(&lock);
            panic!("handler failed");
        }));

        assert!(result.is_err());
        assert_eq!(lock.depth.get(), 1);
    }
}
