//! # Persistent RAM Log Store
//!
//! A ring-buffer log store over a reserved, non-volatile physical memory
//! region. Log text written here survives a reboot, so whatever the kernel
//! managed to say just before a panic can be recovered by a later boot
//! stage or an offline tool.
//!
//! ## What you get
//!
//! - [`RamLogStore`] — an owned store object: physical region reservation,
//!   one-time non-cached mapping, the on-media zone header, and the
//!   circular append cursor.
//! - [`RegionReserver`] / [`RegionMapper`] — the two host seams: the
//!   physical-memory allocator's exclusive claim and the `vmap`-shaped
//!   contiguous mapping primitive.
//! - [`PendingLog`] / [`LogLines`] — the two shapes hosts deliver pending
//!   log text in; both drain identically.
//! - [`bootarg`] — the `<mode>,<address>[,<size>]` boot-line surface.
//! - [`Snapshot`] — a diagnostic view for proc-style tooling.
//!
//! ## Design
//!
//! - The region is split into two equal zones that alternate across boots:
//!   the active zone is zero-filled and written, the other still holds the
//!   previous session for recovery. See [`header`] for the bit-exact
//!   layout.
//! - Appends are infallible and lock-free. The store is built to be written
//!   from a kernel panic handler — interrupts possibly off, allocation
//!   unsafe, reset seconds away — so the append path is a bounds-checked
//!   volatile byte write and nothing else. An inactive store swallows
//!   appends silently; the only symptom any internal failure may have is
//!   the absence of persisted data after a crash.
//! - Initialization is lazy and idempotent: the first emit request maps
//!   the region and drains the host's already-buffered log text; every
//!   later call is a fast no-op. Hosts serialize initialization and
//!   whole-buffer flushes with the lock re-exported as [`SharedStore`];
//!   the append path never takes it.
//!
//! ## Example
//!
//! ```rust
//! use core::ptr::NonNull;
//! use ramlog_addresses::{PhysicalAddress, PhysicalPage};
//! use ramlog_store::{
//!     MapFlags, PendingLog, RamLogStore, RegionDenied, RegionMapper, RegionReserver, ZoneId,
//! };
//!
//! // Host seams, here backed by plain heap memory for the example.
//! struct Memblock;
//! impl RegionReserver for Memblock {
//!     fn claim(&mut self, _: PhysicalAddress, _: u64) -> Result<(), RegionDenied> {
//!         Ok(())
//!     }
//! }
//!
//! #[repr(align(4096))]
//! struct Frame([u8; 4096]);
//! struct Vmap(Vec<Frame>);
//! impl RegionMapper for Vmap {
//!     fn map_contiguous(&mut self, pages: &[PhysicalPage], _: MapFlags) -> Option<NonNull<u8>> {
//!         if pages.len() > self.0.len() {
//!             return None;
//!         }
//!         NonNull::new(self.0.as_mut_ptr().cast())
//!     }
//! }
//!
//! let mut vmap = Vmap((0..8).map(|_| Frame([0; 4096])).collect());
//! let mut store = RamLogStore::new();
//! store
//!     .reserve(&mut Memblock, PhysicalAddress::new(0x0880_0000), 8 * 4096)
//!     .unwrap();
//! store.ensure_initialized(&mut vmap, PendingLog::empty()).unwrap();
//! store.emit_bytes(b"first boot message\n");
//!
//! let mut back = [0u8; 19];
//! store.zone_bytes(ZoneId::Zero, &mut back).unwrap();
//! assert_eq!(&back, b"first boot message\n");
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

extern crate alloc;

pub mod bootarg;
pub mod header;
mod map;
mod region;
mod source;
mod store;

pub use crate::header::{HEADER_MAGIC, HEADER_SIZE, RegionLayout, ZoneHeader, ZoneId};
pub use crate::map::{MapFlags, RegionMapper};
pub use crate::region::{LogRegion, RegionDenied, RegionReserver};
pub use crate::source::{LogLines, PendingLog};
pub use crate::store::{RamLogStore, Snapshot};

use ramlog_addresses::PhysicalAddress;

/// A store instance shared between a console path and a panic path.
///
/// Hosts serialize [`RamLogStore::ensure_initialized`] and whole-buffer
/// flushes through this lock. Fatal-path callers use
/// [`try_lock`](ramlog_sync::SpinLock::try_lock) and accept the loss rather
/// than spin inside a panic handler.
pub type SharedStore = ramlog_sync::SpinLock<RamLogStore>;

pub use ramlog_sync::SpinLock;

/// Why the store could not be brought up.
///
/// All variants are local decisions: they are logged where they occur and
/// the session simply runs without persistent logging. None of them may
/// surface as a fault in the caller's own control flow.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// The physical claim was denied, or the request was malformed.
    #[error("failed to reserve log region at {base} ({size:#x} bytes)")]
    ReservationFailed { base: PhysicalAddress, size: u64 },

    /// Initialization was attempted before a valid reservation.
    #[error("no reserved region to map")]
    NotReserved,

    /// The temporary page list could not be allocated.
    #[error("out of memory building the page list")]
    OutOfMemory,

    /// The host mapper returned no usable window.
    #[error("mapping the reserved region failed")]
    MapFailed,
}
