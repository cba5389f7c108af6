//! Disabling the Windows Platform Binary Table.
//!
//! A WPBT is never removed from the XSDT. Its signature is replaced with
//! [`Signature::NEUTRALIZED`] and its checksum repaired, so that the table set stays
//! consistent while no consumer recognizes the table anymore.

use log::{debug, info, warn};

use crate::{sdt::DescriptionTable, signature::Signature, xsdt::Xsdt, Result};

/// A WPBT that was renamed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Neutralized {
    /// The zero-based position of the table in the XSDT.
    pub index: usize,
    /// The number of entries in the XSDT.
    pub entry_count: usize,
    /// The physical address of the table.
    pub address: u64,
}

/// The outcome of a walk over the XSDT.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// The number of entries in the XSDT.
    pub entry_count: usize,
    /// The number of tables that were renamed.
    pub neutralized: usize,
}

/// Walks every entry of `xsdt` and neutralizes every WPBT it lists.
///
/// `on_match` is called after each table has been renamed.
///
/// # Safety
/// - Every non-null entry of `xsdt` must be readable for the size of a description header.
/// - Every entry whose signature is WPBT must be readable for its declared length, and its
///     header must be writable.
///
/// # Errors
/// [`crate::AcpiError::MalformedExtendedTable`] if the XSDT's length does not describe a whole
/// number of entries. No entry is read in that case.
pub unsafe fn neutralize(
    xsdt: &Xsdt<'_>,
    mut on_match: impl FnMut(&Neutralized),
) -> Result<Summary> {
    let header = xsdt.header();
    let entries = match xsdt.entries() {
        Ok(entries) => entries,
        Err(error) => {
            warn!(
                "XSDT at {:#x} declares a malformed length of {} bytes",
                xsdt.address(),
                header.length()
            );
            return Err(error);
        }
    };

    let entry_count = entries.len();
    info!("XSDT OEM ID \"{}\", {entry_count} entries", header.oem_id());

    let mut summary = Summary {
        entry_count,
        neutralized: 0,
    };

    for (index, address) in entries.enumerate() {
        let position = index + 1;

        // SAFETY:
        // Non-null entries point to readable headers, per the invariants of this function.
        let Some(mut table) = (unsafe { DescriptionTable::from_address(address) }) else {
            warn!("Entry {position}/{entry_count} is null");
            continue;
        };

        let signature = table.signature();
        debug!("Entry {position}/{entry_count}: \"{signature}\" at {address:#x}");
        if signature != Signature::WPBT {
            continue;
        }

        // SAFETY:
        // WPBT entries are readable for their declared length and have a writable header, per
        // the invariants of this function.
        if let Err(error) = unsafe { table.rename(Signature::NEUTRALIZED) } {
            warn!("WPBT table at position {position}/{entry_count} skipped: {error}");
            continue;
        }

        info!(
            "WPBT table found at position {position}/{entry_count}, renamed to \"{}\"",
            Signature::NEUTRALIZED
        );
        summary.neutralized += 1;
        on_match(&Neutralized {
            index,
            entry_count,
            address,
        });
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec::Vec;

    use super::{neutralize, Neutralized, Summary};
    use crate::{checksum, rsdp::locate, testing::Firmware, xsdt::Xsdt, AcpiError};

    fn xsdt_of(firmware: &Firmware) -> Xsdt<'static> {
        // SAFETY:
        // The configuration entries point to buffers owned by `firmware`, which outlives every
        // use of the returned table in these tests.
        unsafe { locate(firmware.configuration()) }
            .unwrap()
            .into_xsdt()
            .unwrap()
    }

    #[test]
    fn every_wpbt_is_neutralized() {
        let (firmware, tables) = Firmware::with_tables(&[*b"WPBT", *b"FACP", *b"WPBT", *b"SSDT"]);
        let xsdt = xsdt_of(&firmware);

        let mut matches = Vec::new();
        // SAFETY:
        // Every entry points to a writable table owned by `firmware`.
        let summary = unsafe { neutralize(&xsdt, |found| matches.push(*found)) }.unwrap();

        assert_eq!(
            summary,
            Summary {
                entry_count: 4,
                neutralized: 2
            }
        );
        assert_eq!(
            matches,
            [
                Neutralized {
                    index: 0,
                    entry_count: 4,
                    address: tables[0]
                },
                Neutralized {
                    index: 2,
                    entry_count: 4,
                    address: tables[2]
                },
            ]
        );

        for &address in &[tables[0], tables[2]] {
            let bytes = firmware.bytes(address);
            assert_eq!(&bytes[..4], b"NMSL");
            assert!(checksum::is_valid(bytes));
        }
        assert_eq!(&firmware.bytes(tables[1])[..4], b"FACP");
        assert_eq!(&firmware.bytes(tables[3])[..4], b"SSDT");
    }

    #[test]
    fn second_walk_changes_nothing() {
        let (firmware, _) = Firmware::with_tables(&[*b"FACP", *b"WPBT", *b"APIC"]);
        let xsdt = xsdt_of(&firmware);

        // SAFETY:
        // Every entry points to a writable table owned by `firmware`.
        let first = unsafe { neutralize(&xsdt, |_| {}) }.unwrap();
        assert_eq!(first.neutralized, 1);

        let before = firmware.snapshot();
        let mut calls = 0;
        // SAFETY:
        // Every entry points to a writable table owned by `firmware`.
        let second = unsafe { neutralize(&xsdt, |_| calls += 1) }.unwrap();

        assert_eq!(second.neutralized, 0);
        assert_eq!(calls, 0);
        assert_eq!(firmware.snapshot(), before);
    }

    #[test]
    fn malformed_xsdt_mutates_nothing() {
        let (mut firmware, tables) = Firmware::with_tables(&[*b"WPBT", *b"WPBT"]);
        let xsdt_address = xsdt_of(&firmware).address();
        firmware.bytes_mut(xsdt_address)[4..8].copy_from_slice(&(36u32 + 8 + 4).to_le_bytes());
        let before = firmware.snapshot();

        let xsdt = xsdt_of(&firmware);
        // SAFETY:
        // Every entry points to a writable table owned by `firmware`.
        let result = unsafe { neutralize(&xsdt, |_| panic!("no table may be renamed")) };

        assert_eq!(result, Err(AcpiError::MalformedExtendedTable));
        assert_eq!(firmware.snapshot(), before);
        assert_eq!(&firmware.bytes(tables[0])[..4], b"WPBT");
    }

    #[test]
    fn null_entries_are_skipped() {
        let mut firmware = Firmware::new();
        let wpbt = firmware.place(Firmware::table(*b"WPBT", 12));
        let xsdt = firmware.place(Firmware::xsdt(&[0, wpbt]));
        let rsdp = firmware.place(Firmware::rsdp(2, xsdt));
        firmware.install(uefi::tables::config::ACPI_2, rsdp);

        let xsdt = xsdt_of(&firmware);
        let mut matches = Vec::new();
        // SAFETY:
        // Every non-null entry points to a writable table owned by `firmware`.
        let summary = unsafe { neutralize(&xsdt, |found| matches.push(found.index)) }.unwrap();

        assert_eq!(summary.entry_count, 2);
        assert_eq!(summary.neutralized, 1);
        assert_eq!(matches, [1]);
    }

    #[test]
    fn truncated_wpbt_is_left_alone() {
        let mut firmware = Firmware::new();
        let mut truncated = Firmware::table(*b"WPBT", 4);
        truncated[4..8].copy_from_slice(&8u32.to_le_bytes());
        let truncated = firmware.place(truncated);
        let intact = firmware.place(Firmware::table(*b"WPBT", 4));
        let xsdt = firmware.place(Firmware::xsdt(&[truncated, intact]));
        let rsdp = firmware.place(Firmware::rsdp(2, xsdt));
        firmware.install(uefi::tables::config::ACPI_2, rsdp);

        let xsdt = xsdt_of(&firmware);
        // SAFETY:
        // Every entry points to a writable table owned by `firmware`.
        let summary = unsafe { neutralize(&xsdt, |_| {}) }.unwrap();

        assert_eq!(summary.neutralized, 1);
        assert_eq!(&firmware.bytes(truncated)[..4], b"WPBT");
        assert_eq!(&firmware.bytes(intact)[..4], b"NMSL");
    }
}
