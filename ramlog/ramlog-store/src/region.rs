//! Physical region reservation.
//!
//! The log region is a fixed physical address range claimed exclusively from
//! the host's physical-memory allocator at boot-configuration time, long
//! before it is mapped or written. The claim itself is a host primitive; this
//! module only carries the claimed range and the collaborator seam.

use core::fmt;
use ramlog_addresses::{PhysicalAddress, page_count};

/// The physical memory claim backing the log store.
///
/// Once a reservation succeeds this value never changes for the life of the
/// store; the region is released only by system shutdown.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LogRegion {
    base: PhysicalAddress,
    size: u64,
}

impl LogRegion {
    #[inline]
    #[must_use]
    pub const fn new(base: PhysicalAddress, size: u64) -> Self {
        Self { base, size }
    }

    #[inline]
    #[must_use]
    pub const fn base(self) -> PhysicalAddress {
        self.base
    }

    #[inline]
    #[must_use]
    pub const fn size(self) -> u64 {
        self.size
    }

    /// Number of whole pages covering the region.
    #[inline]
    #[must_use]
    pub const fn page_count(self) -> u64 {
        page_count(self.size)
    }
}

impl fmt::Display for LogRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {:#x}", self.base, self.size)
    }
}

/// The host denied an exclusive claim on the requested range.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("physical region claim denied")]
pub struct RegionDenied;

/// Host collaborator: the physical-memory allocator's exclusive claim.
///
/// Implementations mark `[base, base + size)` as owned by the caller so no
/// other allocation can land inside it. Claiming is an early-boot operation;
/// implementations need not be reentrant.
pub trait RegionReserver {
    /// Exclusively claim `size` bytes of physical memory starting at `base`.
    ///
    /// # Errors
    /// [`RegionDenied`] if the range is unavailable (already allocated,
    /// outside RAM, or otherwise rejected by the host).
    fn claim(&mut self, base: PhysicalAddress, size: u64) -> Result<(), RegionDenied>;
}
