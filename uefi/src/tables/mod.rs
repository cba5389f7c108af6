//! Definitions of the UEFI tables handed to an image at its entry point.

use core::fmt;

pub mod boot_services;
pub mod config;
pub mod system;

/// The header that precedes every standard UEFI table.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(C)]
pub struct Header {
    /// A 64-bit signature that identifies the type of table that follows.
    pub signature: u64,
    /// The revision of the UEFI specification to which this table conforms.
    pub revision: u32,
    /// The size, in bytes, of the entire table including the [`Header`].
    pub size: u32,
    /// The 32-bit CRC of the entire table, computed with this field set to zero.
    pub crc32: u32,
    /// Must be zero.
    pub reserved: u32,
}

impl Header {
    /// Validates the [`Header`] to which `ptr` points against `signature`.
    ///
    /// The CRC is not checked: firmware is allowed to patch the tables after
    /// the CRC was computed, and the checks performed here are enough to reject
    /// a pointer that does not refer to the expected table.
    ///
    /// # Safety
    /// - `ptr` must be valid for reads of `core::mem::size_of::<Header>()` bytes.
    /// - `ptr` must be properly aligned.
    ///
    /// # Errors
    /// - [`TableHeaderValidationError::NullPointer`] if `ptr` is null.
    /// - [`TableHeaderValidationError::InvalidSignature`] if the signature is not `signature`.
    /// - [`TableHeaderValidationError::NonZeroReserved`] if [`Header::reserved`] is non-zero.
    /// - [`TableHeaderValidationError::TooSmall`] if [`Header::size`] cannot contain the [`Header`].
    pub unsafe fn validate(signature: u64, ptr: *const Header) -> Result<(), TableHeaderValidationError> {
        if ptr.is_null() {
            return Err(TableHeaderValidationError::NullPointer);
        }

        // SAFETY:
        // `ptr` is non-null, and by the invariants of this function, valid for reads.
        let header = unsafe { ptr.read() };

        if header.signature != signature {
            return Err(TableHeaderValidationError::InvalidSignature);
        }
        if header.reserved != 0 {
            return Err(TableHeaderValidationError::NonZeroReserved);
        }
        if (header.size as usize) < core::mem::size_of::<Header>() {
            return Err(TableHeaderValidationError::TooSmall);
        }

        Ok(())
    }
}

/// Various errors that can occur when validating a UEFI table [`Header`].
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum TableHeaderValidationError {
    /// The table pointer was null.
    NullPointer,
    /// The signature did not identify the expected table.
    InvalidSignature,
    /// The reserved field was not zero.
    NonZeroReserved,
    /// The declared size cannot hold a [`Header`].
    TooSmall,
}

impl fmt::Display for TableHeaderValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullPointer => f.write_str("table pointer is null"),
            Self::InvalidSignature => f.write_str("table signature mismatch"),
            Self::NonZeroReserved => f.write_str("reserved header field is non-zero"),
            Self::TooSmall => f.write_str("table is smaller than its header"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Header, TableHeaderValidationError};

    const SIGNATURE: u64 = 0x5453_5953_2049_4249;

    fn header() -> Header {
        Header {
            signature: SIGNATURE,
            revision: (2 << 16) | 70,
            size: 120,
            crc32: 0,
            reserved: 0,
        }
    }

    #[test]
    fn accepts_matching_header() {
        let header = header();

        // SAFETY:
        // `header` is a live, aligned [`Header`].
        assert_eq!(unsafe { Header::validate(SIGNATURE, &header) }, Ok(()));
    }

    #[test]
    fn rejects_bad_headers() {
        let mut bad_signature = header();
        bad_signature.signature = 0;
        let mut bad_reserved = header();
        bad_reserved.reserved = 1;
        let mut bad_size = header();
        bad_size.size = 4;

        // SAFETY:
        // All pointers either point to live, aligned [`Header`]s or are null.
        unsafe {
            assert_eq!(
                Header::validate(SIGNATURE, &bad_signature),
                Err(TableHeaderValidationError::InvalidSignature)
            );
            assert_eq!(
                Header::validate(SIGNATURE, &bad_reserved),
                Err(TableHeaderValidationError::NonZeroReserved)
            );
            assert_eq!(
                Header::validate(SIGNATURE, &bad_size),
                Err(TableHeaderValidationError::TooSmall)
            );
            assert_eq!(
                Header::validate(SIGNATURE, core::ptr::null()),
                Err(TableHeaderValidationError::NullPointer)
            );
        }
    }
}
