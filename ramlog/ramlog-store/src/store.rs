//! The persistent ring-buffer log store.
//!
//! One [`RamLogStore`] owns the full life of the reserved region: the
//! physical claim, the one-time mapping, the on-media header, and the
//! append cursor. The store is an ordinary owned object — hosts that share
//! it between a console path and a panic path wrap it in a
//! [`SpinLock`](ramlog_sync::SpinLock); nothing in here takes a lock, and
//! the append path in particular must stay lock-free so a panic handler can
//! always make forward progress.
//!
//! ## Life cycle
//!
//! 1. Boot parameters reserve the region ([`RamLogStore::reserve`]).
//! 2. The first emit request calls [`RamLogStore::ensure_initialized`],
//!    which maps the region, runs the fresh/warm header step, and drains
//!    whatever the host has already logged.
//! 3. Every later emit appends directly ([`RamLogStore::emit_byte`]).
//! 4. On a fatal event the flush driver drains the complete pending log
//!    ([`RamLogStore::drain`]).
//!
//! Every step that can fail reports locally (`log::error!` plus an error
//! value) and leaves the store inert: the absence of persisted log data is
//! the only symptom a failure may have.

use crate::StoreError;
use crate::header::{RegionLayout, ZoneHeader, ZoneId};
use crate::map::{MapFlags, MappedWindow, RegionMapper};
use crate::region::{LogRegion, RegionReserver};
use crate::source::PendingLog;
use alloc::vec::Vec;
use log::{error, info};
use ramlog_addresses::{PhysicalAddress, PhysicalPage};

/// Write position within the active zone's data area.
///
/// A true circular cursor: after the last byte it wraps to the start and
/// silently overwrites the oldest data. `pos < len` holds between calls.
#[derive(Debug)]
struct ZoneCursor {
    start: usize,
    len: usize,
    pos: usize,
}

impl ZoneCursor {
    const fn new(start: usize, len: usize) -> Self {
        Self { start, len, pos: 0 }
    }

    const fn pos(&self) -> usize {
        self.pos
    }

    fn push(&mut self, window: &mut MappedWindow, byte: u8) {
        if self.len == 0 {
            return;
        }
        window.write_byte(self.start + self.pos, byte);
        self.pos += 1;
        if self.pos == self.len {
            self.pos = 0;
        }
    }
}

struct Mapped {
    window: MappedWindow,
    layout: RegionLayout,
}

struct ZoneWriter {
    zone: ZoneId,
    cursor: ZoneCursor,
}

/// Diagnostic view of a store, for proc-style tooling.
#[derive(Copy, Clone, Debug)]
pub struct Snapshot {
    pub region: Option<LogRegion>,
    pub mapped: bool,
    pub active: bool,
    pub active_zone: Option<ZoneId>,
    pub zone_size: usize,
    pub write_offset: usize,
    pub zone_counts: [u32; 2],
}

/// The persistent ring-buffer log store.
pub struct RamLogStore {
    region: Option<LogRegion>,
    mapped: Option<Mapped>,
    writer: Option<ZoneWriter>,
}

impl Default for RamLogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RamLogStore {
    /// An empty store: nothing reserved, nothing mapped, appends no-op.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            region: None,
            mapped: None,
            writer: None,
        }
    }

    /// Claim the physical region for the log store.
    ///
    /// Idempotent: once a region is held, further calls succeed without
    /// touching the host again (a boot-parameter reservation followed by a
    /// redundant call from recovery logic must not double-reserve).
    ///
    /// Only valid during early boot, before concurrent access begins.
    ///
    /// # Errors
    /// [`StoreError::ReservationFailed`] if `base` or `size` is zero, or if
    /// the host denies the claim. Region state is left unset and logging
    /// stays disabled for the session; there is no retry.
    pub fn reserve(
        &mut self,
        reserver: &mut dyn RegionReserver,
        base: PhysicalAddress,
        size: u64,
    ) -> Result<(), StoreError> {
        if self.region.is_some() {
            return Ok(());
        }
        if base.is_zero() || size == 0 {
            error!("rejecting log region reservation at {base} (size = {size:#x})");
            return Err(StoreError::ReservationFailed { base, size });
        }
        if reserver.claim(base, size).is_err() {
            self.region = None;
            error!("failed to reserve log region at {base} (size = {size:#x})");
            return Err(StoreError::ReservationFailed { base, size });
        }
        self.region = Some(LogRegion::new(base, size));
        Ok(())
    }

    /// Map the reserved region and bring the append path up.
    ///
    /// Idempotent and intended to be callable from every emit site: only
    /// the first call (or the first after a failed attempt) does real work.
    /// On success the store runs the fresh/warm header step, zero-fills the
    /// newly active zone, enables appends, and immediately drains `pending`
    /// — capturing whatever the host logged between early boot and now.
    ///
    /// Concurrent callers must be serialized by the host (see the crate
    /// docs); this method is the single place the mapping happens.
    ///
    /// # Errors
    /// [`StoreError::NotReserved`] before a successful [`reserve`](Self::reserve);
    /// [`StoreError::OutOfMemory`] if the temporary page list cannot be
    /// allocated; [`StoreError::MapFailed`] if the host returns no usable
    /// window. All three leave the store inert and are never retried
    /// automatically.
    pub fn ensure_initialized(
        &mut self,
        mapper: &mut dyn RegionMapper,
        pending: PendingLog<'_>,
    ) -> Result<(), StoreError> {
        if self.writer.is_some() || self.mapped.is_some() {
            return Ok(());
        }
        let Some(region) = self.region else {
            error!("log store initialization attempted without a reserved region");
            return Err(StoreError::NotReserved);
        };

        let mut window = Self::map_region(mapper, region)?;
        let layout = RegionLayout::new(window.len());

        let mut header = window.read_header();
        let zone = if header.is_valid() {
            header.activate_next()
        } else {
            header = ZoneHeader::fresh();
            header.active()
        };
        window.write_header(&header);

        // The newly active zone always starts empty; only the other zone's
        // previous session survives for post-mortem recovery.
        let start = layout.zone_data_offset(zone);
        window.fill_zero(start, layout.zone_size());

        self.mapped = Some(Mapped { window, layout });
        self.writer = Some(ZoneWriter {
            zone,
            cursor: ZoneCursor::new(start, layout.zone_size()),
        });
        info!(
            "persistent log store active: zone {zone}, {} bytes",
            layout.zone_size()
        );

        self.drain(pending);
        Ok(())
    }

    /// Build the page list and ask the host for the contiguous window.
    fn map_region(
        mapper: &mut dyn RegionMapper,
        region: LogRegion,
    ) -> Result<MappedWindow, StoreError> {
        let Ok(page_total) = usize::try_from(region.page_count()) else {
            error!("log region too large to describe ({region})");
            return Err(StoreError::MapFailed);
        };

        let mut pages: Vec<PhysicalPage> = Vec::new();
        if pages.try_reserve_exact(page_total).is_err() {
            error!("out of memory building a {page_total}-entry page list");
            return Err(StoreError::OutOfMemory);
        }
        let first = PhysicalPage::containing(region.base());
        for n in 0..region.page_count() {
            pages.push(first.nth_next(n));
        }

        let base = mapper.map_contiguous(&pages, MapFlags::WRITABLE | MapFlags::NON_CACHED);
        // The page list is temporary; release it whatever the outcome was.
        drop(pages);

        let Some(base) = base else {
            error!("mapping the reserved log region failed ({region})");
            return Err(StoreError::MapFailed);
        };
        let Ok(len) = usize::try_from(region.size()) else {
            return Err(StoreError::MapFailed);
        };
        if len < crate::header::HEADER_SIZE {
            error!("reserved log region cannot hold a header ({region})");
            return Err(StoreError::MapFailed);
        }
        // SAFETY: the mapper contract guarantees `base` covers the page
        // list — and thus `region.size()` bytes — exclusively, for the
        // process lifetime, at page alignment.
        Ok(unsafe { MappedWindow::new(base, len) })
    }

    /// Append one byte to the active zone.
    ///
    /// Never fails and never blocks: on an inactive store this is a silent
    /// no-op, so every log call-site may call it unconditionally — a
    /// logging failure must not be able to take down a panic path.
    #[inline]
    pub fn append_byte(&mut self, byte: u8) {
        let (Some(mapped), Some(writer)) = (&mut self.mapped, &mut self.writer) else {
            return;
        };
        writer.cursor.push(&mut mapped.window, byte);
    }

    /// Append a span of bytes, in order.
    ///
    /// Equivalent to calling [`append_byte`](Self::append_byte) per byte;
    /// wrap semantics are identical.
    pub fn append_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.append_byte(byte);
        }
    }

    /// Console-facing alias for [`append_byte`](Self::append_byte).
    #[inline]
    pub fn emit_byte(&mut self, byte: u8) {
        self.append_byte(byte);
    }

    /// Console-facing alias for [`append_bytes`](Self::append_bytes).
    #[inline]
    pub fn emit_bytes(&mut self, bytes: &[u8]) {
        self.append_bytes(bytes);
    }

    /// Drain pending host log text into the ring, in order.
    ///
    /// Both [`PendingLog`] shapes reduce to the same byte loop; no retry,
    /// no backoff.
    pub fn drain(&mut self, pending: PendingLog<'_>) {
        match pending {
            PendingLog::Segments(segments) => {
                for segment in segments {
                    self.append_bytes(segment);
                }
            }
            PendingLog::Lines(lines) => {
                lines.rewind();
                while let Some(line) = lines.next_line() {
                    self.append_bytes(line);
                }
            }
        }
    }

    /// Turn the append path off again.
    ///
    /// The mapping and the on-media header stay as they are; only the
    /// in-memory writer is dropped. Appends become silent no-ops.
    pub fn deactivate(&mut self) {
        if self.writer.take().is_some() {
            info!("persistent log store deactivated");
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.writer.is_some()
    }

    #[inline]
    #[must_use]
    pub const fn is_mapped(&self) -> bool {
        self.mapped.is_some()
    }

    #[inline]
    #[must_use]
    pub const fn region(&self) -> Option<LogRegion> {
        self.region
    }

    #[must_use]
    pub fn active_zone(&self) -> Option<ZoneId> {
        self.writer.as_ref().map(|w| w.zone)
    }

    /// How often `zone` has been the active zone, as recorded on media.
    #[must_use]
    pub fn zone_write_count(&self, zone: ZoneId) -> Option<u32> {
        self.mapped
            .as_ref()
            .map(|m| m.window.read_header().zone_counts[zone.index()])
    }

    /// Copy a zone's data area into `out`.
    ///
    /// Returns the number of bytes copied (`min(out.len(), zone_size)`),
    /// or `None` while nothing is mapped. Reading the *inactive* zone is
    /// how recovery tooling lifts the previous session's log.
    #[must_use]
    pub fn zone_bytes(&self, zone: ZoneId, out: &mut [u8]) -> Option<usize> {
        let mapped = self.mapped.as_ref()?;
        let n = out.len().min(mapped.layout.zone_size());
        mapped
            .window
            .read_into(mapped.layout.zone_data_offset(zone), &mut out[..n]);
        Some(n)
    }

    /// Diagnostic view of the store.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            region: self.region,
            mapped: self.mapped.is_some(),
            active: self.writer.is_some(),
            active_zone: self.active_zone(),
            zone_size: self.mapped.as_ref().map_or(0, |m| m.layout.zone_size()),
            write_offset: self.writer.as_ref().map_or(0, |w| w.cursor.pos()),
            zone_counts: self
                .mapped
                .as_ref()
                .map_or([0, 0], |m| m.window.read_header().zone_counts),
        }
    }
}
