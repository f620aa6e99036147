// src/thread_bound.rs

use std::sync::Arc;

use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};

use crate::executor::Executor;

/// A handle whose inner value's construction, every method call, and
/// destruction all run on one designated [`Executor`] thread (§4.5).
///
/// This is the idiomatic-Rust rendition of `ThreadLocalObject<T>`: the raw
/// pointer plus `assert(thread->IsCurrent())` becomes a `Mutex` (contended
/// only in the brief window around construction/teardown — every other
/// access is already serialized onto the owning thread) plus a
/// `ThreadId` comparison.
pub struct ThreadBoundObject<T: Send + 'static> {
    executor: Arc<Executor>,
    value: Arc<Mutex<Option<T>>>,
}

impl<T: Send + 'static> ThreadBoundObject<T> {
    /// Posts construction of `T` to `executor` and returns immediately;
    /// the value isn't guaranteed to exist until that posted task runs.
    pub fn new<F>(executor: Arc<Executor>, factory: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let value = Arc::new(Mutex::new(None));
        let construct_into = value.clone();
        executor.post(move || {
            *construct_into.lock() = Some(factory());
        });
        Self { executor, value }
    }

    /// Posts `f` to the owning thread; it runs with exclusive `&mut`
    /// access to the inner value.
    pub fn perform<F>(&self, f: F)
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        let value = self.value.clone();
        self.executor.post(move || {
            let mut guard = value.lock();
            let inner = guard.as_mut().expect("ThreadBoundObject value not yet constructed");
            f(inner);
        });
    }

    /// Returns a direct guard to the inner value. Panics if the calling
    /// thread isn't the owning executor's thread.
    pub fn get_sync_assuming_same_thread(&self) -> MappedMutexGuard<'_, T> {
        assert!(
            self.executor.is_current_thread(),
            "get_sync_assuming_same_thread called off the owning executor thread"
        );
        MutexGuard::map(self.value.lock(), |v| {
            v.as_mut().expect("ThreadBoundObject value not yet constructed")
        })
    }
}

impl<T: Send + 'static> Drop for ThreadBoundObject<T> {
    fn drop(&mut self) {
        let value = self.value.clone();
        self.executor.post(move || {
            *value.lock() = None;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perform_mutates_on_the_owning_thread() {
        let executor = Arc::new(Executor::spawn("tbo-test"));
        let owning = executor.owning_thread();
        let handle = ThreadBoundObject::new(executor.clone(), || 0u32);

        handle.perform(move |v| {
            assert_eq!(std::thread::current().id(), owning);
            *v += 1;
        });

        let done = Arc::new(parking_lot::Mutex::new(false));
        let done2 = done.clone();
        handle.perform(move |v| {
            assert_eq!(*v, 1);
            *done2.lock() = true;
        });

        // Drain the executor's queue deterministically for the test.
        drop(handle);
        drop(executor);
        assert!(*done.lock());
    }

    #[test]
    #[should_panic(expected = "owning executor thread")]
    fn sync_access_off_thread_panics() {
        let executor = Arc::new(Executor::spawn("tbo-test-2"));
        let handle = ThreadBoundObject::new(executor.clone(), || 5u32);
        std::thread::sleep(std::time::Duration::from_millis(20));
        let _ = handle.get_sync_assuming_same_thread();
    }
}
