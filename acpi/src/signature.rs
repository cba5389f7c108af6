//! ASCII identifiers found in ACPI headers.

use core::fmt;

/// The four character identifier at the start of every description table.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Signature([u8; 4]);

impl Signature {
    /// Extended System Description Table.
    pub const XSDT: Signature = Signature(*b"XSDT");
    /// Windows Platform Binary Table.
    pub const WPBT: Signature = Signature(*b"WPBT");
    /// The signature a disabled WPBT is renamed to. No ACPI consumer looks for it.
    pub const NEUTRALIZED: Signature = Signature(*b"NMSL");

    /// Creates a [`Signature`] from its bytes, in memory order.
    #[must_use]
    pub const fn new(bytes: [u8; 4]) -> Signature {
        Signature(bytes)
    }

    /// Creates a [`Signature`] from its packed little-endian value.
    #[must_use]
    pub const fn from_u32(value: u32) -> Signature {
        Signature(value.to_le_bytes())
    }

    /// Returns the packed little-endian value of the [`Signature`].
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        u32::from_le_bytes(self.0)
    }

    /// Returns the bytes of the [`Signature`], in memory order.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature(\"{self}\")")
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_ascii(f, &self.0)
    }
}

/// The six character OEM identifier carried by ACPI headers.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct OemId([u8; 6]);

impl OemId {
    /// Creates an [`OemId`] from its bytes.
    #[must_use]
    pub const fn new(bytes: [u8; 6]) -> OemId {
        OemId(bytes)
    }

    /// Returns the bytes of the [`OemId`].
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl fmt::Debug for OemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OemId(\"{self}\")")
    }
}

impl fmt::Display for OemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // OEM IDs are padded with spaces or NULs.
        let end = self
            .0
            .iter()
            .rposition(|&byte| byte != b' ' && byte != 0)
            .map_or(0, |index| index + 1);

        write_ascii(f, &self.0[..end])
    }
}

/// Writes printable ASCII bytes as-is and escapes everything else.
fn write_ascii(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for &byte in bytes {
        if byte.is_ascii_graphic() || byte == b' ' {
            fmt::Write::write_char(f, char::from(byte))?;
        } else {
            write!(f, "\\x{byte:02x}")?;
        }
    }

    Ok(())
}
