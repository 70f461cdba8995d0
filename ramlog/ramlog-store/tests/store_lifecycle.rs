//! End-to-end store life cycle against one persistent backing memory:
//! reserve, map, log, "reboot", and recover the previous session.

use core::ptr::NonNull;
use ramlog_addresses::{PAGE_SIZE, PhysicalAddress, PhysicalPage};
use ramlog_store::{
    HEADER_SIZE, MapFlags, PendingLog, RamLogStore, RegionDenied, RegionMapper, RegionReserver,
    SharedStore, ZoneId,
};

#[repr(align(4096))]
struct Frame(#[allow(dead_code)] [u8; 4096]);

/// Fake non-volatile RAM. The buffer outlives any one store, so mapping it
/// again after dropping a store behaves like a warm boot: the header and
/// the inactive zone are still there.
struct TestRam(Vec<Frame>);

impl TestRam {
    fn new(frames: usize) -> Self {
        Self((0..frames).map(|_| Frame([0; 4096])).collect())
    }
}

impl RegionMapper for TestRam {
    fn map_contiguous(&mut self, pages: &[PhysicalPage], _: MapFlags) -> Option<NonNull<u8>> {
        if pages.len() > self.0.len() {
            return None;
        }
        NonNull::new(self.0.as_mut_ptr().cast::<u8>())
    }
}

struct Memblock;

impl RegionReserver for Memblock {
    fn claim(&mut self, _: PhysicalAddress, _: u64) -> Result<(), RegionDenied> {
        Ok(())
    }
}

const BASE: PhysicalAddress = PhysicalAddress::new(0x0880_0000);
const REGION_SIZE: u64 = 8 * PAGE_SIZE; // 32768 bytes
const ZONE_SIZE: usize = (REGION_SIZE as usize) / 2 - HEADER_SIZE;

fn boot(ram: &mut TestRam, pending: PendingLog<'_>) -> RamLogStore {
    let mut store = RamLogStore::new();
    store.reserve(&mut Memblock, BASE, REGION_SIZE).expect("reserve");
    store.ensure_initialized(ram, pending).expect("init");
    store
}

#[test]
fn two_boots_alternate_zones_and_preserve_the_first_session() {
    let mut ram = TestRam::new(8);

    // First boot ever: fresh header, zone 0 active.
    let mut first = boot(&mut ram, PendingLog::empty());
    let snap = first.snapshot();
    assert_eq!(snap.active_zone, Some(ZoneId::Zero));
    assert_eq!(snap.zone_size, ZONE_SIZE);
    assert_eq!(snap.zone_counts, [1, 0]);

    let message = b"first boot message\n";
    first.emit_bytes(message);

    let mut back = [0u8; 19];
    first.zone_bytes(ZoneId::Zero, &mut back).unwrap();
    assert_eq!(&back, message);
    drop(first);

    // Warm boot against the same memory: zone flips, zone 1 counts once,
    // and the first session is still sitting in zone 0.
    let mut second = boot(&mut ram, PendingLog::empty());
    let snap = second.snapshot();
    assert_eq!(snap.active_zone, Some(ZoneId::One));
    assert_eq!(snap.zone_counts, [1, 1]);
    assert_eq!(second.zone_write_count(ZoneId::One), Some(1));

    let mut recovered = [0u8; 19];
    second.zone_bytes(ZoneId::Zero, &mut recovered).unwrap();
    assert_eq!(&recovered, message);

    second.emit_bytes(b"second boot\n");
    drop(second);

    // Third boot: back to zone 0 (now cleared), zone 1 preserved.
    let third = boot(&mut ram, PendingLog::empty());
    let snap = third.snapshot();
    assert_eq!(snap.active_zone, Some(ZoneId::Zero));
    assert_eq!(snap.zone_counts, [2, 1]);

    let mut kept = [0u8; 12];
    third.zone_bytes(ZoneId::One, &mut kept).unwrap();
    assert_eq!(&kept, b"second boot\n");

    let mut cleared = [0u8; 19];
    third.zone_bytes(ZoneId::Zero, &mut cleared).unwrap();
    assert_eq!(&cleared, &[0u8; 19]);
}

#[test]
fn both_zones_have_the_same_usable_size() {
    let mut ram = TestRam::new(8);
    let store = boot(&mut ram, PendingLog::empty());

    // Zone sizes are derived, not stored: both zones must fit behind the
    // header inside the mapped window.
    let snap = store.snapshot();
    assert_eq!(snap.zone_size, ZONE_SIZE);
    assert!(HEADER_SIZE + 2 * snap.zone_size <= REGION_SIZE as usize);

    // Reading either zone yields the same byte count.
    let mut buf = vec![0u8; ZONE_SIZE + 100];
    assert_eq!(store.zone_bytes(ZoneId::Zero, &mut buf), Some(ZONE_SIZE));
    assert_eq!(store.zone_bytes(ZoneId::One, &mut buf), Some(ZONE_SIZE));
}

#[test]
fn shared_store_serves_console_and_panic_paths() {
    let mut ram = TestRam::new(8);
    let shared: SharedStore = SharedStore::new(RamLogStore::new());

    shared.with_lock(|store| {
        store.reserve(&mut Memblock, BASE, REGION_SIZE).expect("reserve");
        store
            .ensure_initialized(&mut ram, PendingLog::Segments(&[b"console up\n"]))
            .expect("init");
    });

    // A fatal-path caller must never spin: try_lock or lose the bytes.
    if let Some(mut store) = shared.try_lock() {
        store.emit_bytes(b"panic!\n");
    }

    shared.with_lock(|store| {
        let mut data = [0u8; 18];
        store.zone_bytes(ZoneId::Zero, &mut data).unwrap();
        assert_eq!(&data, b"console up\npanic!\n");
    });
}
