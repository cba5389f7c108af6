//! Locating the ACPI tables handed over by UEFI firmware and disabling the
//! Windows Platform Binary Table among them.
//!
//! Every structure is accessed in place, in memory owned by the firmware. Nothing is
//! allocated or copied, and the only write ever performed is the header store of
//! [`sdt::DescriptionTable::rename`].

#![no_std]

use core::fmt;

use log::info;
use uefi::tables::config::ConfigurationTable;

pub mod checksum;
pub mod rsdp;
pub mod sdt;
pub mod signature;
pub mod utils;
pub mod wpbt;
pub mod xsdt;

#[cfg(test)]
mod testing;

/// The result type of the ACPI operations.
pub type Result<T> = core::result::Result<T, AcpiError>;

/// The reasons the WPBT could not be searched for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcpiError {
    /// No configuration table entry holds an ACPI root pointer.
    RootPointerNotFound,
    /// A root pointer was found, but none of them leads to a valid XSDT.
    ExtendedTableNotFound,
    /// The XSDT's length does not describe a whole number of entries.
    MalformedExtendedTable,
}

impl fmt::Display for AcpiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootPointerNotFound => f.write_str("ACPI root pointer not found"),
            Self::ExtendedTableNotFound => f.write_str("XSDT not found"),
            Self::MalformedExtendedTable => f.write_str("XSDT length is malformed"),
        }
    }
}

/// Locates the XSDT through `tables` and neutralizes every WPBT it lists.
///
/// `on_match` is called for every table that was renamed.
///
/// # Safety
/// - Every ACPI entry of `tables` must point to memory that is either a root pointer or at
///     least 8 readable bytes.
/// - Every table reachable from a revision 2 root pointer must be identity mapped and
///     readable for its declared length, and a WPBT's header must be writable.
///
/// # Errors
/// - [`AcpiError::RootPointerNotFound`] if no entry holds a root pointer.
/// - [`AcpiError::ExtendedTableNotFound`] if no root pointer leads to a valid XSDT.
/// - [`AcpiError::MalformedExtendedTable`] if the XSDT's length is malformed, in which case no
///     entry was read.
pub unsafe fn drop_wpbt(
    tables: &[ConfigurationTable],
    on_match: impl FnMut(&wpbt::Neutralized),
) -> Result<wpbt::Summary> {
    // SAFETY:
    // The invariants of `locate()` are upheld by the caller.
    let roots = unsafe { rsdp::locate(tables) }?;
    info!("RSDP found at {:#x}", roots.rsdp.address());

    let xsdt = roots.into_xsdt()?;

    // SAFETY:
    // The invariants of `neutralize()` are upheld by the caller.
    let summary = unsafe { wpbt::neutralize(&xsdt, on_match) }?;
    info!(
        "{} of {} tables neutralized",
        summary.neutralized, summary.entry_count
    );

    Ok(summary)
}
