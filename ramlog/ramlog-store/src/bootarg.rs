//! Boot-line configuration of the reserved region.
//!
//! The region is configured with a single parameter of the form
//! `<mode>,<address>[,<size>]`: mode `1` supplies only a start address
//! (nothing can be reserved without a size), mode `2` supplies both and
//! triggers an immediate reservation. Values are decimal or `0x`-prefixed
//! hex. Malformed or zero values parse to `None` and are silently treated
//! as "no reservation" — a bad boot line must never stop the boot.

use crate::region::RegionReserver;
use crate::store::RamLogStore;
use ramlog_addresses::PhysicalAddress;

/// A parsed boot argument, tagged by arity.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BootArg {
    /// Mode 1: a start address with no size. Recorded but not reservable.
    AddressOnly(PhysicalAddress),
    /// Mode 2: address and size; a reservation request.
    AddressAndSize(PhysicalAddress, u64),
}

/// Parse a `<mode>,<address>[,<size>]` boot argument.
///
/// Returns `None` for anything that does not exactly match one of the two
/// forms, including zero addresses or sizes.
#[must_use]
pub fn parse(arg: &str) -> Option<BootArg> {
    let mut fields = arg.split(',');
    let mode = int_field(fields.next()?)?;

    let parsed = match mode {
        1 => BootArg::AddressOnly(PhysicalAddress::new(nonzero(int_field(fields.next()?)?)?)),
        2 => {
            let addr = nonzero(int_field(fields.next()?)?)?;
            let size = nonzero(int_field(fields.next()?)?)?;
            BootArg::AddressAndSize(PhysicalAddress::new(addr), size)
        }
        _ => return None,
    };

    // Trailing fields make the argument malformed, not "mostly fine".
    if fields.next().is_some() {
        return None;
    }
    Some(parsed)
}

/// Parse and apply a boot argument to a store.
///
/// Only the two-argument form reserves; everything else (including parse
/// failures) is silently accepted as "no reservation". A reservation
/// failure has already been reported by the store and is swallowed here:
/// boot continues either way.
pub fn apply(store: &mut RamLogStore, reserver: &mut dyn RegionReserver, arg: &str) {
    if let Some(BootArg::AddressAndSize(base, size)) = parse(arg) {
        let _ = store.reserve(reserver, base, size);
    }
}

fn int_field(field: &str) -> Option<u64> {
    let field = field.trim();
    if let Some(hex) = field.strip_prefix("0x").or_else(|| field.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        field.parse().ok()
    }
}

const fn nonzero(v: u64) -> Option<u64> {
    if v == 0 { None } else { Some(v) }
}
