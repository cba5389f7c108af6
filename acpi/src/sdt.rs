//! The generic description table header, and access to tables that live in firmware memory.

use core::{fmt, marker::PhantomData, mem, ptr::NonNull};

use crate::{
    checksum,
    signature::{OemId, Signature},
    utils::{u32_to_usize, u64_to_usize},
};

/// Generic System Description Table Header.
///
/// All system description tables begin with this header.
/// See ACPI v6.4 section 5.2.6
#[derive(Debug, Clone, Copy)]
#[repr(C, packed)]
pub struct SdtHeader {
    pub signature: [u8; 4],
    pub length: u32,
    pub revision: u8,
    pub checksum: u8,
    pub oem_id: [u8; 6],
    pub oem_table_id: [u8; 8],
    pub oem_revision: u32,
    pub creator_id: u32,
    pub creator_revision: u32,
}

const _: () = assert!(SdtHeader::SIZE == 36);

impl SdtHeader {
    /// The size of the header in bytes.
    pub const SIZE: usize = mem::size_of::<SdtHeader>();

    #[must_use]
    pub fn signature(&self) -> Signature {
        Signature::new(self.signature)
    }

    /// The length of the whole table, header included.
    #[must_use]
    pub fn length(&self) -> u32 {
        self.length
    }

    #[must_use]
    pub fn oem_id(&self) -> OemId {
        OemId::new(self.oem_id)
    }
}

/// A description table living in firmware memory, accessed in place.
pub struct DescriptionTable<'a> {
    ptr: NonNull<SdtHeader>,
    lifetime: PhantomData<&'a mut SdtHeader>,
}

impl<'a> DescriptionTable<'a> {
    /// Interprets the memory at `address` as a description table.
    ///
    /// Returns `None` if `address` is null or not addressable.
    ///
    /// # Safety
    /// - If non-null, `address` must be readable for [`SdtHeader::SIZE`] bytes for `'a`.
    /// - Only the header is assumed to be readable; the methods that touch the body carry
    ///     their own requirements.
    #[must_use]
    pub unsafe fn from_address(address: u64) -> Option<DescriptionTable<'a>> {
        let ptr = NonNull::new(u64_to_usize(address)? as *mut SdtHeader)?;

        Some(DescriptionTable {
            ptr,
            lifetime: PhantomData,
        })
    }

    /// Returns the physical address of the table.
    #[must_use]
    pub fn address(&self) -> u64 {
        self.ptr.as_ptr() as usize as u64
    }

    /// Returns a pointer to the start of the table.
    #[must_use]
    pub fn as_ptr(&self) -> *const SdtHeader {
        self.ptr.as_ptr()
    }

    /// Returns a copy of the table's header.
    #[must_use]
    pub fn header(&self) -> SdtHeader {
        // SAFETY:
        // The header is readable per the invariants of `from_address()`. The table
        // is packed, so an unaligned read is required.
        unsafe { self.ptr.as_ptr().read_unaligned() }
    }

    /// Returns the table's signature.
    #[must_use]
    pub fn signature(&self) -> Signature {
        self.header().signature()
    }

    /// Returns every byte of the table, as declared by its header.
    ///
    /// Returns `None` if the declared length cannot hold the header itself.
    ///
    /// # Safety
    /// The declared length of the table must describe memory readable for `'a`.
    #[must_use]
    pub unsafe fn bytes(&self) -> Option<&[u8]> {
        let length = u32_to_usize(self.header().length());
        if length < SdtHeader::SIZE {
            return None;
        }

        // SAFETY:
        // By the invariants of this function, `length` bytes are readable, and no
        // mutable access can exist while `self` is borrowed.
        Some(unsafe { core::slice::from_raw_parts(self.ptr.as_ptr().cast::<u8>(), length) })
    }

    /// Returns whether the table's bytes sum to zero, or `None` if its length is invalid.
    ///
    /// # Safety
    /// The declared length of the table must describe memory readable for `'a`.
    #[must_use]
    pub unsafe fn is_checksum_valid(&self) -> Option<bool> {
        // SAFETY:
        // The invariants of `bytes()` are the same as this function's invariants.
        unsafe { self.bytes() }.map(checksum::is_valid)
    }

    /// Replaces the table's signature with `signature` and repairs the checksum, so that the
    /// table sums to zero afterwards.
    ///
    /// The new signature and checksum are stored in a single header write; nothing outside
    /// the header is written.
    ///
    /// # Safety
    /// - The declared length of the table must describe memory readable for `'a`.
    /// - The header must be writable.
    ///
    /// # Errors
    /// Returns [`TableLengthError`] without writing anything if the declared length cannot
    /// hold the header.
    pub unsafe fn rename(&mut self, signature: Signature) -> Result<(), TableLengthError> {
        let mut header = self.header();

        // SAFETY:
        // The invariants of `bytes()` are upheld by the caller.
        let bytes = unsafe { self.bytes() }.ok_or(TableLengthError {
            length: header.length(),
        })?;

        let rest = checksum::sum(bytes)
            .wrapping_sub(header.checksum)
            .wrapping_sub(checksum::sum(&header.signature))
            .wrapping_add(checksum::sum(signature.as_bytes()));

        header.signature = *signature.as_bytes();
        header.checksum = 0u8.wrapping_sub(rest);

        // SAFETY:
        // The header is writable per the invariants of this function, and `&mut self`
        // guarantees no outstanding borrows of the table's bytes.
        unsafe { self.ptr.as_ptr().write_unaligned(header) };

        Ok(())
    }
}

impl fmt::Debug for DescriptionTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptionTable")
            .field("address", &format_args!("{:#x}", self.address()))
            .field("signature", &self.signature())
            .finish()
    }
}

/// A table declared a length that cannot contain its own header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableLengthError {
    /// The declared length.
    pub length: u32,
}

impl fmt::Display for TableLengthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "declared length {} is smaller than the {} byte header",
            self.length,
            SdtHeader::SIZE
        )
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::{format, string::String};

    use super::{DescriptionTable, SdtHeader, TableLengthError};
    use crate::{checksum, signature::Signature, testing::Firmware};

    #[test]
    fn header_fields_are_read_in_place() {
        let mut firmware = Firmware::new();
        let address = firmware.place(Firmware::table(*b"FACP", 16));

        // SAFETY:
        // `address` points to a live table owned by `firmware`.
        let table = unsafe { DescriptionTable::from_address(address) }.unwrap();
        let header = table.header();

        assert_eq!(table.address(), address);
        assert_eq!(table.signature(), Signature::new(*b"FACP"));
        assert_eq!(header.length(), 52);
        assert_eq!(format_oem(header), "DWPBT");
    }

    fn format_oem(header: SdtHeader) -> String {
        format!("{}", header.oem_id())
    }

    #[test]
    fn null_address_is_rejected() {
        // SAFETY:
        // A null address is never dereferenced.
        assert!(unsafe { DescriptionTable::from_address(0) }.is_none());
    }

    #[test]
    fn rename_keeps_the_table_summing_to_zero() {
        let mut firmware = Firmware::new();
        let address = firmware.place(Firmware::table(*b"WPBT", 27));

        // SAFETY:
        // `address` points to a live, writable table owned by `firmware`.
        unsafe {
            let mut table = DescriptionTable::from_address(address).unwrap();
            assert_eq!(table.is_checksum_valid(), Some(true));

            table.rename(Signature::NEUTRALIZED).unwrap();

            assert_eq!(table.signature(), Signature::NEUTRALIZED);
            assert_eq!(table.is_checksum_valid(), Some(true));
        }

        let bytes = firmware.bytes(address);
        assert_eq!(&bytes[..4], b"NMSL");
        assert!(checksum::is_valid(bytes));
    }

    #[test]
    fn rename_repairs_a_table_with_a_stale_checksum() {
        let mut firmware = Firmware::new();
        let mut bytes = Firmware::table(*b"WPBT", 8);
        bytes[9] = bytes[9].wrapping_add(0x11);
        let address = firmware.place(bytes);

        // SAFETY:
        // `address` points to a live, writable table owned by `firmware`.
        unsafe {
            let mut table = DescriptionTable::from_address(address).unwrap();
            assert_eq!(table.is_checksum_valid(), Some(false));

            table.rename(Signature::NEUTRALIZED).unwrap();
            assert_eq!(table.is_checksum_valid(), Some(true));
        }
    }

    #[test]
    fn rename_only_touches_signature_and_checksum() {
        let mut firmware = Firmware::new();
        let address = firmware.place(Firmware::table(*b"WPBT", 40));
        let before = firmware.bytes(address).to_vec();

        // SAFETY:
        // `address` points to a live, writable table owned by `firmware`.
        unsafe {
            let mut table = DescriptionTable::from_address(address).unwrap();
            table.rename(Signature::NEUTRALIZED).unwrap();
        }

        let after = firmware.bytes(address);
        for (index, (old, new)) in before.iter().zip(after).enumerate() {
            if !(index < 4 || index == 9) {
                assert_eq!(old, new, "byte {index} changed");
            }
        }
    }

    #[test]
    fn rename_refuses_truncated_tables() {
        let mut firmware = Firmware::new();
        let mut bytes = Firmware::table(*b"WPBT", 0);
        bytes[4..8].copy_from_slice(&20u32.to_le_bytes());
        let address = firmware.place(bytes);
        let before = firmware.bytes(address).to_vec();

        // SAFETY:
        // `address` points to a live, writable table owned by `firmware`.
        let result = unsafe {
            let mut table = DescriptionTable::from_address(address).unwrap();
            table.rename(Signature::NEUTRALIZED)
        };

        assert_eq!(result, Err(TableLengthError { length: 20 }));
        assert_eq!(firmware.bytes(address), &before[..]);
    }
}
