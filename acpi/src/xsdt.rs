//! The Extended System Description Table.

use core::{fmt, iter::FusedIterator, marker::PhantomData, mem};

use crate::{
    sdt::{DescriptionTable, SdtHeader},
    signature::Signature,
    utils::u32_to_usize,
    AcpiError, Result,
};

const ENTRY_SIZE: usize = mem::size_of::<u64>();

/// Extended System Description Table.
///
/// Its body is an array of 64-bit physical addresses of the other description tables.
/// See ACPI v6.4 section 5.2.8
pub struct Xsdt<'a> {
    table: DescriptionTable<'a>,
}

impl<'a> Xsdt<'a> {
    /// Interprets the memory at `address` as an XSDT.
    ///
    /// Returns `None` if `address` is null or not addressable, and the signature that was
    /// found instead if the table is not an XSDT.
    ///
    /// # Safety
    /// - If non-null, `address` must be readable for [`SdtHeader::SIZE`] bytes for `'a`.
    /// - If the table is an XSDT, its declared length must describe memory readable for `'a`.
    #[must_use]
    pub unsafe fn from_address(
        address: u64,
    ) -> Option<core::result::Result<Xsdt<'a>, Signature>> {
        // SAFETY:
        // The invariants of `DescriptionTable::from_address()` are upheld by the caller.
        let table = unsafe { DescriptionTable::from_address(address) }?;

        let signature = table.signature();
        if signature != Signature::XSDT {
            return Some(Err(signature));
        }

        Some(Ok(Xsdt { table }))
    }

    /// Returns a copy of the XSDT's header.
    #[must_use]
    pub fn header(&self) -> SdtHeader {
        self.table.header()
    }

    /// Returns the physical address of the XSDT.
    #[must_use]
    pub fn address(&self) -> u64 {
        self.table.address()
    }

    /// Returns whether the XSDT's bytes sum to zero.
    ///
    /// Returns `None` without reading the body if the declared length is malformed.
    #[must_use]
    pub fn is_checksum_valid(&self) -> Option<bool> {
        self.entry_count().ok()?;

        // SAFETY:
        // The declared length is readable per the invariants of `from_address()`.
        unsafe { self.table.is_checksum_valid() }
    }

    /// Returns the number of entries the XSDT declares.
    ///
    /// # Errors
    /// [`AcpiError::MalformedExtendedTable`] if the declared length does not describe a whole
    /// number of entries after the header.
    pub fn entry_count(&self) -> Result<usize> {
        entry_count(self.header().length())
    }

    /// Returns an iterator over the physical addresses listed by the XSDT, in table order.
    ///
    /// # Errors
    /// [`AcpiError::MalformedExtendedTable`] if the declared length does not describe a whole
    /// number of entries after the header.
    pub fn entries(&self) -> Result<Entries<'a>> {
        let count = self.entry_count()?;

        Ok(Entries {
            // SAFETY:
            // The declared length is at least the header size, so the entry array starts inside
            // the table.
            base: unsafe { self.table.as_ptr().cast::<u8>().add(SdtHeader::SIZE) },
            index: 0,
            count,
            lifetime: PhantomData,
        })
    }
}

impl fmt::Debug for Xsdt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Xsdt")
            .field("address", &format_args!("{:#x}", self.address()))
            .field("length", &self.header().length())
            .field("oem_id", &self.header().oem_id())
            .finish()
    }
}

/// Computes the number of entries of an XSDT whose header declares `length` bytes.
///
/// # Errors
/// [`AcpiError::MalformedExtendedTable`] if `length` is smaller than the header, or leaves a
/// partial entry after it.
pub fn entry_count(length: u32) -> Result<usize> {
    let body = u32_to_usize(length)
        .checked_sub(SdtHeader::SIZE)
        .ok_or(AcpiError::MalformedExtendedTable)?;

    if body % ENTRY_SIZE != 0 {
        return Err(AcpiError::MalformedExtendedTable);
    }

    Ok(body / ENTRY_SIZE)
}

/// Iterator over the entries of an [`Xsdt`].
///
/// Entries are only 4-byte aligned in practice, so every entry is read unaligned.
#[derive(Clone)]
pub struct Entries<'a> {
    base: *const u8,
    index: usize,
    count: usize,
    lifetime: PhantomData<&'a [u8]>,
}

impl Iterator for Entries<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }

        // SAFETY:
        // `index < count`, and `count` entries fit within the table's declared length, which
        // is readable per the invariants of `Xsdt::from_address()`.
        let entry = unsafe {
            self.base
                .add(self.index * ENTRY_SIZE)
                .cast::<u64>()
                .read_unaligned()
        };
        self.index += 1;

        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Entries<'_> {}

impl FusedIterator for Entries<'_> {}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec::Vec;

    use super::{entry_count, Xsdt};
    use crate::{signature::Signature, testing::Firmware, AcpiError};

    #[test]
    fn entry_count_follows_the_declared_length() {
        assert_eq!(entry_count(36), Ok(0));
        assert_eq!(entry_count(44), Ok(1));
        assert_eq!(entry_count(36 + 8 * 31), Ok(31));
    }

    #[test]
    fn entry_count_rejects_malformed_lengths() {
        assert_eq!(entry_count(0), Err(AcpiError::MalformedExtendedTable));
        assert_eq!(entry_count(35), Err(AcpiError::MalformedExtendedTable));
        assert_eq!(entry_count(40), Err(AcpiError::MalformedExtendedTable));
        assert_eq!(entry_count(36 + 8 + 1), Err(AcpiError::MalformedExtendedTable));
    }

    #[test]
    fn entries_are_listed_in_table_order() {
        let listed = [0x1000, 0xDEAD_BEEF_0000, 0, 0x7];
        let mut firmware = Firmware::new();
        let address = firmware.place(Firmware::xsdt(&listed));

        // SAFETY:
        // `address` points to a live table owned by `firmware`.
        let xsdt = unsafe { Xsdt::from_address(address) }.unwrap().unwrap();
        let entries = xsdt.entries().unwrap();

        assert_eq!(xsdt.address(), address);
        assert_eq!(xsdt.is_checksum_valid(), Some(true));
        assert_eq!(entries.len(), 4);
        assert_eq!(entries.collect::<Vec<_>>(), listed);
    }

    #[test]
    fn empty_table_has_no_entries() {
        let mut firmware = Firmware::new();
        let address = firmware.place(Firmware::xsdt(&[]));

        // SAFETY:
        // `address` points to a live table owned by `firmware`.
        let xsdt = unsafe { Xsdt::from_address(address) }.unwrap().unwrap();
        assert_eq!(xsdt.entry_count(), Ok(0));
        assert_eq!(xsdt.entries().unwrap().next(), None);
    }

    #[test]
    fn other_signatures_are_reported() {
        let mut firmware = Firmware::new();
        let address = firmware.place(Firmware::table(*b"RSDT", 4));

        // SAFETY:
        // `address` points to a live table owned by `firmware`.
        let result = unsafe { Xsdt::from_address(address) }.unwrap();
        assert_eq!(result.unwrap_err(), Signature::new(*b"RSDT"));

        // SAFETY:
        // A null address is never dereferenced.
        assert!(unsafe { Xsdt::from_address(0) }.is_none());
    }

    #[test]
    fn malformed_length_yields_no_entries() {
        let mut firmware = Firmware::new();
        let address = firmware.place(Firmware::xsdt(&[0x1000, 0x2000]));
        firmware.bytes_mut(address)[4..8].copy_from_slice(&(36u32 + 12).to_le_bytes());

        // SAFETY:
        // `address` points to a live table owned by `firmware`, and the declared length is
        // shorter than the buffer.
        let xsdt = unsafe { Xsdt::from_address(address) }.unwrap().unwrap();
        assert_eq!(xsdt.entry_count(), Err(AcpiError::MalformedExtendedTable));
        assert_eq!(xsdt.is_checksum_valid(), None);
        assert!(xsdt.entries().is_err());
    }
}
