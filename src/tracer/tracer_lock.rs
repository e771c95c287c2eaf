use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A reader/writer lock around one piece of tracer state.
///
/// Guards are only held by `CallStackTracer` methods for a map lookup, insert
/// or removal, or for swapping the printer slot. No log event, printer or
/// other caller-provided code runs while a guard is alive, and none of the
/// guarded operations panic. A poisoned lock can therefore only come from a
/// bug in the tracer itself, and is not recovered from.
#[repr(transparent)]
pub(crate) struct TracerLock<T>(RwLock<T>);

#[repr(transparent)]
pub(crate) struct TracerLockReadGuard<'a, T>(RwLockReadGuard<'a, T>);

#[repr(transparent)]
pub(crate) struct TracerLockWriteGuard<'a, T>(RwLockWriteGuard<'a, T>);

impl<T> TracerLock<T> {
    #[must_use]
    pub(crate) const fn new(value: T) -> Self {
        Self(RwLock::new(value))
    }

    #[inline]
    pub(crate) fn read(&self) -> TracerLockReadGuard<'_, T> {
        TracerLockReadGuard(self.0.read().expect("Unable to acquire tracer lock"))
    }

    #[inline]
    pub(crate) fn write(&self) -> TracerLockWriteGuard<'_, T> {
        TracerLockWriteGuard(self.0.write().expect("Unable to acquire tracer lock"))
    }
}

impl<T> TracerLockReadGuard<'_, T> {
    #[inline]
    pub(crate) fn get(&self) -> &T {
        &self.0
    }
}

impl<T> TracerLockWriteGuard<'_, T> {
    #[inline]
    pub(crate) fn get(&mut self) -> &mut T {
        &mut self.0
    }
}
