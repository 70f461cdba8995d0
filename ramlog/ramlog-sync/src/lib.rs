//! # Spin lock for the persistent log store
//!
//! The store itself is a plain `&mut self` object; a host that shares one
//! instance between its console path and its panic path wraps it in this
//! lock. The design intent is narrow:
//!
//! - lazy initialization and whole-buffer flushes are serialized through the
//!   lock;
//! - the byte append path is **never** made to depend on acquiring it — a
//!   lock that cannot be taken inside a panic handler would turn a logging
//!   failure into a hang. Hosts that append from a fatal context either own
//!   the store exclusively or use [`SpinLock::try_lock`] and accept the loss.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

use core::{
    cell::UnsafeCell,
    hint::spin_loop,
    ops::{Deref, DerefMut},
    sync::atomic::{AtomicBool, Ordering},
};

/// Test-and-test-and-set spin lock with an RAII guard.
pub struct SpinLock<T> {
    /// `true` while a guard is live.
    locked: AtomicBool,
    value: UnsafeCell<T>,
}

// Safety: the guard provides mutual exclusion, so sharing the lock between
// contexts only needs T to be sendable across them.
unsafe impl<T: Send> Sync for SpinLock<T> {}

impl<T> SpinLock<T> {
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            value: UnsafeCell::new(value),
        }
    }

    /// Single acquisition attempt; never spins.
    ///
    /// This is the only acquisition form a fatal-path caller should use.
    #[inline]
    #[must_use]
    pub fn try_lock(&self) -> Option<SpinGuard<'_, T>> {
        // The guard must only exist on success: dropping one unlocks.
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
            .then(|| SpinGuard { lock: self })
    }

    /// Spin until the lock is acquired.
    #[inline]
    #[must_use]
    pub fn lock(&self) -> SpinGuard<'_, T> {
        loop {
            if let Some(guard) = self.try_lock() {
                return guard;
            }
            // Spin on plain loads until the lock looks free, then retry the CAS.
            while self.locked.load(Ordering::Relaxed) {
                spin_loop();
            }
        }
    }

    /// Run `f` under the lock.
    #[inline]
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.lock())
    }

    /// Direct access through `&mut self`; no other holder can exist.
    #[inline]
    pub const fn get_mut(&mut self) -> &mut T {
        self.value.get_mut()
    }
}

pub struct SpinGuard<'a, T> {
    lock: &'a SpinLock<T>,
}

impl<T> Deref for SpinGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        unsafe { &*self.lock.value.get() }
    }
}

impl<T> DerefMut for SpinGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.lock.value.get() }
    }
}

impl<T> Drop for SpinGuard<'_, T> {
    fn drop(&mut self) {
        // Release publishes everything written under the guard.
        self.lock.locked.store(false, Ordering::Release);
    }
}
