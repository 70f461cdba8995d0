//! # Panic flush driver
//!
//! Subscribes (by way of the host's notification dispatcher) to fatal log
//! dumps and drains the pending kernel log into the persistent ring. This
//! runs in the most fragile context the kernel has: inside the panic
//! handler, interrupts possibly disabled, allocation unsafe, the watchdog
//! already winding up. Accordingly it does nothing but filter the reason
//! and forward bytes — no retry, no backoff, no locking, and no way to
//! fail back into the panic path.
//!
//! Only the panic reason persists anything. Regular shutdowns and
//! out-of-memory notices are deliberately ignored: the ring's capacity is
//! scarce, and the one session worth keeping is the one that died
//! screaming.

#![cfg_attr(not(any(test, doctest)), no_std)]

use ramlog_store::{PendingLog, RamLogStore};

/// Why the host requested a log dump.
///
/// Mirrors the host's kmsg-dump taxonomy; only [`Panic`](DumpReason::Panic)
/// reaches the persistent ring.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DumpReason {
    /// Kernel panic. The only reason that persists.
    Panic,
    /// Recoverable oops; the system keeps running and can log normally.
    Oops,
    /// Out-of-memory notice.
    OutOfMemory,
    /// Orderly shutdown or restart.
    Shutdown,
}

impl DumpReason {
    /// Whether this reason burns persistent ring capacity.
    #[inline]
    #[must_use]
    pub const fn persists(self) -> bool {
        matches!(self, Self::Panic)
    }
}

/// Fatal-dump entry point, invoked by the host's notification dispatcher.
///
/// For [`DumpReason::Panic`] every byte of `pending` is appended, in order,
/// through the store's infallible append path; on an uninitialized store
/// that path is a silent no-op, so this is safe to wire up before the store
/// is ready. Every other reason returns without touching the ring.
pub fn on_fatal_dump(store: &mut RamLogStore, reason: DumpReason, pending: PendingLog<'_>) {
    if !reason.persists() {
        log::debug!("ignoring log dump for non-panic reason {reason:?}");
        return;
    }
    store.drain(pending);
}
