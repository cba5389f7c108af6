//! Definitions related to UEFI configuration tables.

use core::ffi::c_void;

use crate::{datatypes::Guid, guid};

/// [`ConfigurationTable::vendor_guid`] of the ACPI 1.0 root pointer.
pub const ACPI: Guid = guid!("eb9d2d30-2d88-11d3-9a16-0090273fc14d");

/// [`ConfigurationTable::vendor_guid`] of the ACPI 2.0 root pointer.
pub const ACPI_2: Guid = guid!("8868e871-e4f1-11d3-bc22-0080c73c8881");

/// [`ConfigurationTable::vendor_guid`] of the SMBIOS table.
pub const SMBIOS: Guid = guid!("eb9d2d31-2d88-11d3-9a16-0090273fc14d");

/// Contains a [`Guid`] and pointer pair that identifies the table and its location.
#[repr(C)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ConfigurationTable {
    /// The [`Guid`] that uniquely identifies the system [`ConfigurationTable`].
    pub vendor_guid: Guid,
    /// A pointer to the table associated with [`ConfigurationTable::vendor_guid`].
    pub vendor_table: *mut c_void,
}

impl ConfigurationTable {
    /// Returns `true` if this entry points to an ACPI root pointer of either revision.
    #[must_use]
    pub fn is_acpi(&self) -> bool {
        self.vendor_guid == ACPI || self.vendor_guid == ACPI_2
    }
}
