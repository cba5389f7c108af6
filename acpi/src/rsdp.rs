//! Locating the Root System Description Pointer through the UEFI configuration tables.

use core::{ffi::c_void, fmt};

use log::{debug, info, warn};
use uefi::tables::config::ConfigurationTable;

use crate::{
    checksum,
    signature::{OemId, Signature},
    xsdt::Xsdt,
    AcpiError, Result,
};

/// Root System Description Pointer.
///
/// The revision number indicates the size. (2 == RsdpV2).
/// See ACPI v6.4 section 5.2.5.3
#[derive(Debug, Clone, Copy)]
#[repr(C, packed)]
pub struct Rsdp {
    pub signature: [u8; 8],
    pub checksum: u8,
    pub oem_id: [u8; 6],
    pub revision: u8,
    pub rsdt_address: u32,
}

impl Rsdp {
    pub const SIGNATURE: [u8; 8] = *b"RSD PTR ";

    /// The first revision whose layout carries [`RsdpV2::xsdt_address`].
    pub const EXTENDED_REVISION: u8 = 2;
}

/// Root System Description Pointer for revision 2 and later.
///
/// See ACPI v6.4 section 5.2.5.3
#[derive(Debug, Clone, Copy)]
#[repr(C, packed)]
pub struct RsdpV2 {
    pub rsdp: Rsdp,
    pub length: u32,
    pub xsdt_address: u64,
    pub extended_checksum: u8,
    pub _reserved: [u8; 3],
}

/// A root pointer accepted by its signature, referenced in place.
#[derive(Clone, Copy)]
pub enum RootPointer<'a> {
    /// A revision 0 or 1 pointer, which does not carry an XSDT address.
    Legacy(&'a Rsdp),
    /// A revision 2 or later pointer.
    Extended(&'a RsdpV2),
}

impl<'a> RootPointer<'a> {
    /// Interprets the memory at `ptr` as a root pointer.
    ///
    /// Returns `None` if `ptr` is null or does not start with [`Rsdp::SIGNATURE`].
    ///
    /// # Safety
    /// If non-null, `ptr` must be readable for the size of an [`Rsdp`] for `'a`, and for the
    /// size of an [`RsdpV2`] if the structure declares revision 2 or later.
    #[must_use]
    pub unsafe fn from_ptr(ptr: *const c_void) -> Option<RootPointer<'a>> {
        if ptr.is_null() {
            return None;
        }

        // SAFETY:
        // `ptr` is non-null and readable for at least the size of an [`Rsdp`], and
        // [`Rsdp`] has an alignment of one.
        let rsdp = unsafe { &*ptr.cast::<Rsdp>() };
        if rsdp.signature != Rsdp::SIGNATURE {
            return None;
        }

        if rsdp.revision < Rsdp::EXTENDED_REVISION {
            return Some(RootPointer::Legacy(rsdp));
        }

        // SAFETY:
        // The structure declares revision 2 or later, so it is readable for the size of an
        // [`RsdpV2`], which has an alignment of one.
        Some(RootPointer::Extended(unsafe { &*ptr.cast::<RsdpV2>() }))
    }

    /// Returns the revision-independent part of the root pointer.
    #[must_use]
    pub fn rsdp(&self) -> &'a Rsdp {
        match self {
            RootPointer::Legacy(rsdp) => rsdp,
            RootPointer::Extended(rsdp) => &rsdp.rsdp,
        }
    }

    #[must_use]
    pub fn revision(&self) -> u8 {
        self.rsdp().revision
    }

    #[must_use]
    pub fn oem_id(&self) -> OemId {
        OemId::new(self.rsdp().oem_id)
    }

    /// Returns the address of the root pointer.
    #[must_use]
    pub fn address(&self) -> u64 {
        core::ptr::from_ref(self.rsdp()) as usize as u64
    }

    /// Returns the XSDT address, which only revision 2 and later carry.
    #[must_use]
    pub fn xsdt_address(&self) -> Option<u64> {
        match self {
            RootPointer::Legacy(_) => None,
            RootPointer::Extended(rsdp) => Some(rsdp.xsdt_address),
        }
    }

    /// Returns `true` if the checksum of the revision 1 fields is valid.
    #[must_use]
    pub fn is_checksum_valid(&self) -> bool {
        let rsdp = self.rsdp();

        // SAFETY:
        // `rsdp` is a live reference to a packed structure of `size_of::<Rsdp>()` bytes.
        let bytes = unsafe {
            core::slice::from_raw_parts(
                core::ptr::from_ref(rsdp).cast::<u8>(),
                core::mem::size_of::<Rsdp>(),
            )
        };

        checksum::is_valid(bytes)
    }

    /// Follows the XSDT address and validates the table's signature.
    ///
    /// # Safety
    /// If the root pointer carries a non-null XSDT address, it must be readable for the size of a
    /// description header for `'a`.
    ///
    /// # Errors
    /// [`ExtendedTableError`] describing why no XSDT is available.
    pub unsafe fn extended_table(&self) -> core::result::Result<Xsdt<'a>, ExtendedTableError> {
        let address = self
            .xsdt_address()
            .ok_or(ExtendedTableError::UnsupportedRevision(self.revision()))?;

        // SAFETY:
        // The invariants of `Xsdt::from_address()` are upheld by the caller.
        match unsafe { Xsdt::from_address(address) } {
            Some(Ok(xsdt)) => Ok(xsdt),
            Some(Err(signature)) => Err(ExtendedTableError::InvalidSignature(signature)),
            None => Err(ExtendedTableError::NullAddress),
        }
    }
}

impl fmt::Debug for RootPointer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootPointer")
            .field("address", &format_args!("{:#x}", self.address()))
            .field("revision", &self.revision())
            .field("oem_id", &self.oem_id())
            .finish_non_exhaustive()
    }
}

/// The reasons a root pointer does not lead to an XSDT.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtendedTableError {
    /// The root pointer predates revision 2.
    UnsupportedRevision(u8),
    /// The XSDT address is null or not addressable.
    NullAddress,
    /// The referenced table is not an XSDT.
    InvalidSignature(Signature),
}

impl fmt::Display for ExtendedTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedRevision(revision) => write!(f, "revision {revision} has no XSDT"),
            Self::NullAddress => f.write_str("XSDT address is null"),
            Self::InvalidSignature(signature) => write!(f, "invalid XSDT signature \"{signature}\""),
        }
    }
}

/// The outcome of a successful root pointer search.
#[derive(Debug)]
pub struct RootPointers<'a> {
    /// The accepted root pointer.
    pub rsdp: RootPointer<'a>,
    /// The validated XSDT, if the root pointer leads to one.
    pub xsdt: Option<Xsdt<'a>>,
}

impl<'a> RootPointers<'a> {
    /// Returns the XSDT.
    ///
    /// # Errors
    /// [`AcpiError::ExtendedTableNotFound`] if no valid XSDT was found.
    pub fn into_xsdt(self) -> Result<Xsdt<'a>> {
        self.xsdt.ok_or(AcpiError::ExtendedTableNotFound)
    }
}

/// Searches the configuration tables for an ACPI root pointer.
///
/// Entries are visited in firmware order. The first entry that yields both a root pointer and a
/// valid XSDT ends the search. If no entry does, the first root pointer found is returned
/// without an XSDT.
///
/// # Safety
/// Every configuration table entry carrying an ACPI GUID must point to memory that is either
/// a root pointer or at least 8 readable bytes, and every XSDT address reachable from a
/// revision 2 root pointer must be null or readable for a description header, for `'a`.
///
/// # Errors
/// [`AcpiError::RootPointerNotFound`] if no entry holds a root pointer.
pub unsafe fn locate<'a>(tables: &[ConfigurationTable]) -> Result<RootPointers<'a>> {
    let count = tables.len();
    let mut fallback = None;

    for (index, table) in tables.iter().enumerate() {
        let position = index + 1;

        if !table.is_acpi() {
            debug!("Table #{position}/{count}: not ACPI ({})", table.vendor_guid);
            continue;
        }

        // SAFETY:
        // ACPI entries point to root pointers or readable memory, per the invariants of this function.
        let Some(rsdp) = (unsafe { RootPointer::<'a>::from_ptr(table.vendor_table) }) else {
            debug!("Table #{position}/{count}: not RSDP");
            continue;
        };

        info!(
            "Table #{position}/{count}: RSDP revision {} at {:#x}",
            rsdp.revision(),
            rsdp.address()
        );
        if !rsdp.is_checksum_valid() {
            warn!("RSDP at {:#x} has an invalid checksum", rsdp.address());
        }

        // SAFETY:
        // XSDT addresses are null or readable, per the invariants of this function.
        match unsafe { rsdp.extended_table() } {
            Ok(xsdt) => {
                info!(
                    "XSDT at {:#x}, OEM ID \"{}\"",
                    xsdt.address(),
                    xsdt.header().oem_id()
                );
                if xsdt.is_checksum_valid() == Some(false) {
                    warn!("XSDT at {:#x} has an invalid checksum", xsdt.address());
                }
                return Ok(RootPointers {
                    rsdp,
                    xsdt: Some(xsdt),
                });
            }
            Err(error) => {
                warn!("Table #{position}/{count}: {error}");
                fallback.get_or_insert(rsdp);
            }
        }
    }

    fallback
        .map(|rsdp| RootPointers { rsdp, xsdt: None })
        .ok_or(AcpiError::RootPointerNotFound)
}

#[cfg(test)]
mod tests {
    use uefi::{guid, tables::config};

    use super::{locate, ExtendedTableError, RootPointer, Rsdp};
    use crate::{signature::Signature, testing::Firmware, AcpiError};

    #[test]
    fn no_acpi_entries_is_not_found() {
        let mut firmware = Firmware::new();
        let smbios = firmware.place(Firmware::rsdp(2, 0));
        firmware.install(config::SMBIOS, smbios);
        firmware.install(guid!("00000000-0000-0000-0000-000000000000"), 0);

        // SAFETY:
        // The configuration entries point to buffers owned by `firmware`, or are null.
        let result = unsafe { locate(firmware.configuration()) };
        assert_eq!(result.unwrap_err(), AcpiError::RootPointerNotFound);

        // SAFETY:
        // An empty slice is never dereferenced.
        let result = unsafe { locate(&[]) };
        assert_eq!(result.unwrap_err(), AcpiError::RootPointerNotFound);
    }

    #[test]
    fn wrong_marker_is_skipped() {
        let mut firmware = Firmware::new();
        let mut bogus = Firmware::rsdp(2, 0);
        bogus[0..8].copy_from_slice(b"RSD PTR\0");
        let bogus = firmware.place(bogus);
        firmware.install(config::ACPI_2, bogus);
        firmware.install(config::ACPI, 0);

        // SAFETY:
        // The configuration entries point to buffers owned by `firmware`, or are null.
        let result = unsafe { locate(firmware.configuration()) };
        assert_eq!(result.unwrap_err(), AcpiError::RootPointerNotFound);
    }

    #[test]
    fn wrong_marker_does_not_stop_the_search() {
        let (mut firmware, _) = Firmware::with_tables(&[*b"FACP"]);
        let bogus = firmware.place(Firmware::table(*b"RSDT", 0));
        let mut configuration = firmware.configuration().to_vec();
        configuration.insert(
            0,
            uefi::tables::config::ConfigurationTable {
                vendor_guid: config::ACPI,
                vendor_table: usize::try_from(bogus).unwrap() as *mut core::ffi::c_void,
            },
        );

        // SAFETY:
        // The configuration entries point to buffers owned by `firmware`.
        let roots = unsafe { locate(&configuration) }.unwrap();
        assert_eq!(roots.rsdp.revision(), 2);
        assert!(roots.xsdt.is_some());
    }

    #[test]
    fn legacy_revision_has_no_extended_table() {
        let mut firmware = Firmware::new();
        let xsdt = firmware.place(Firmware::xsdt(&[]));
        let mut legacy = Firmware::rsdp(2, xsdt).into_vec();
        // A revision 0 structure whose trailing bytes would still hold a plausible address.
        legacy[15] = 0;
        let legacy = firmware.place(legacy.into_boxed_slice());
        firmware.install(config::ACPI, legacy);

        // SAFETY:
        // The configuration entries point to buffers owned by `firmware`.
        let roots = unsafe { locate(firmware.configuration()) }.unwrap();
        assert!(matches!(roots.rsdp, RootPointer::Legacy(_)));
        assert_eq!(roots.rsdp.xsdt_address(), None);
        assert!(roots.xsdt.is_none());
        assert_eq!(roots.into_xsdt().unwrap_err(), AcpiError::ExtendedTableNotFound);
    }

    #[test]
    fn invalid_xsdt_signature_is_rejected() {
        let mut firmware = Firmware::new();
        let rsdt = firmware.place(Firmware::table(*b"RSDT", 8));
        let rsdp = firmware.place(Firmware::rsdp(2, rsdt));
        firmware.install(config::ACPI_2, rsdp);

        // SAFETY:
        // `rsdp` points to a buffer owned by `firmware`.
        let pointer = unsafe { RootPointer::from_ptr(firmware.bytes(rsdp).as_ptr().cast()) }.unwrap();
        // SAFETY:
        // The XSDT address points to a buffer owned by `firmware`.
        let error = unsafe { pointer.extended_table() }.unwrap_err();
        assert_eq!(
            error,
            ExtendedTableError::InvalidSignature(Signature::new(*b"RSDT"))
        );

        // SAFETY:
        // The configuration entries point to buffers owned by `firmware`.
        let roots = unsafe { locate(firmware.configuration()) }.unwrap();
        assert_eq!(roots.rsdp.address(), rsdp);
        assert!(roots.xsdt.is_none());
    }

    #[test]
    fn null_xsdt_address_is_rejected() {
        let mut firmware = Firmware::new();
        let rsdp = firmware.place(Firmware::rsdp(2, 0));
        firmware.install(config::ACPI_2, rsdp);

        // SAFETY:
        // The configuration entries point to buffers owned by `firmware`.
        let roots = unsafe { locate(firmware.configuration()) }.unwrap();
        assert!(roots.xsdt.is_none());

        // SAFETY:
        // The XSDT address is null.
        let error = unsafe { roots.rsdp.extended_table() }.unwrap_err();
        assert_eq!(error, ExtendedTableError::NullAddress);
    }

    #[test]
    fn first_complete_pair_wins() {
        let mut firmware = Firmware::new();

        let legacy = firmware.place(Firmware::rsdp(0, 0));
        firmware.install(config::ACPI, legacy);

        let first_xsdt = firmware.place(Firmware::xsdt(&[]));
        let first = firmware.place(Firmware::rsdp(2, first_xsdt));
        firmware.install(config::ACPI_2, first);

        let second_xsdt = firmware.place(Firmware::xsdt(&[]));
        let second = firmware.place(Firmware::rsdp(2, second_xsdt));
        firmware.install(config::ACPI_2, second);

        // SAFETY:
        // The configuration entries point to buffers owned by `firmware`.
        let roots = unsafe { locate(firmware.configuration()) }.unwrap();
        assert_eq!(roots.rsdp.address(), first);
        assert_eq!(roots.xsdt.unwrap().address(), first_xsdt);
    }

    #[test]
    fn fallback_is_the_first_root_pointer() {
        let mut firmware = Firmware::new();
        let legacy = firmware.place(Firmware::rsdp(1, 0));
        firmware.install(config::ACPI, legacy);
        let broken = firmware.place(Firmware::rsdp(2, 0));
        firmware.install(config::ACPI_2, broken);

        // SAFETY:
        // The configuration entries point to buffers owned by `firmware`.
        let roots = unsafe { locate(firmware.configuration()) }.unwrap();
        assert_eq!(roots.rsdp.address(), legacy);
        assert_eq!(roots.rsdp.revision(), 1);
        assert!(roots.rsdp.is_checksum_valid());
    }

    #[test]
    fn marker_is_compared_exactly() {
        assert_eq!(&Rsdp::SIGNATURE, b"RSD PTR ");
        assert_eq!(core::mem::size_of::<Rsdp>(), 20);
        assert_eq!(core::mem::size_of::<super::RsdpV2>(), 36);
    }
}
