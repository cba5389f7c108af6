//! Definitions and helper functions for UEFI datatypes.

use core::{ffi::c_void, fmt, ptr::NonNull};

/// A collection of related interfaces provided by UEFI firmware.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct RawHandle(pub *mut c_void);

impl RawHandle {
    /// The null handle, used where UEFI accepts an absent handle.
    pub const NULL: RawHandle = RawHandle(core::ptr::null_mut());
}

/// A [`RawHandle`] that is known to be non-null.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Handle(NonNull<c_void>);

impl Handle {
    /// Converts `raw` into a [`Handle`], returning `None` if `raw` is null.
    #[must_use]
    pub fn new(raw: RawHandle) -> Option<Handle> {
        NonNull::new(raw.0).map(Handle)
    }

    /// Returns the [`RawHandle`] form of this [`Handle`].
    #[must_use]
    pub const fn as_raw(self) -> RawHandle {
        RawHandle(self.0.as_ptr())
    }
}

/// An opaque event object managed by the boot services.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct RawEvent(pub *mut c_void);

/// A status code returned by UEFI functions.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Status(usize);

impl Status {
    /// The operation completed successfully.
    pub const SUCCESS: Status = Status(0);

    /// The string contained one or more characters that the device could not render
    /// and were skipped.
    pub const WARN_UNKNOWN_GLYPH: Status = Status(1);

    /// The image failed to load.
    pub const LOAD_ERROR: Status = Status(Status::ERROR_BIT | 1);
    /// A parameter was incorrect.
    pub const INVALID_PARAMETER: Status = Status(Status::ERROR_BIT | 2);
    /// The operation is not supported.
    pub const UNSUPPORTED: Status = Status(Status::ERROR_BIT | 3);
    /// The buffer was not the proper size for the request.
    pub const BAD_BUFFER_SIZE: Status = Status(Status::ERROR_BIT | 4);
    /// The buffer is not large enough to hold the requested data.
    pub const BUFFER_TOO_SMALL: Status = Status(Status::ERROR_BIT | 5);
    /// There is no pending data upon return.
    pub const NOT_READY: Status = Status(Status::ERROR_BIT | 6);
    /// The physical device reported an error while attempting the operation.
    pub const DEVICE_ERROR: Status = Status(Status::ERROR_BIT | 7);
    /// A resource has run out.
    pub const OUT_OF_RESOURCES: Status = Status(Status::ERROR_BIT | 9);
    /// An inconsistency was detected on the file system.
    pub const VOLUME_CORRUPTED: Status = Status(Status::ERROR_BIT | 10);
    /// The device does not contain any medium to perform the operation.
    pub const NO_MEDIA: Status = Status(Status::ERROR_BIT | 12);
    /// The item was not found.
    pub const NOT_FOUND: Status = Status(Status::ERROR_BIT | 14);
    /// Access was denied.
    pub const ACCESS_DENIED: Status = Status(Status::ERROR_BIT | 15);
    /// The operation was aborted.
    pub const ABORTED: Status = Status(Status::ERROR_BIT | 21);
    /// The operation was not performed due to a security violation.
    pub const SECURITY_VIOLATION: Status = Status(Status::ERROR_BIT | 26);
    /// The end of the file was reached.
    pub const END_OF_FILE: Status = Status(Status::ERROR_BIT | 31);
    /// The security status of the data is unknown or compromised.
    pub const COMPROMISED_DATA: Status = Status(Status::ERROR_BIT | 33);

    /// All [`Status`]'s with the [`Status::ERROR_BIT`] set are error codes.
    const ERROR_BIT: usize = 1 << (usize::BITS - 1);

    /// Returns `true` if `self` is an error code.
    #[must_use]
    pub const fn error(self) -> bool {
        self.0 & Status::ERROR_BIT == Status::ERROR_BIT
    }

    /// Returns `true` if `self` is a warning code.
    #[must_use]
    pub const fn warning(self) -> bool {
        !self.error() && self.0 != Status::SUCCESS.0
    }

    /// Converts `self` into a [`Result`], treating warnings as success.
    ///
    /// # Errors
    /// Returns `Err(self)` if `self` is an error code.
    pub const fn into_result(self) -> Result<(), Status> {
        if self.error() {
            Err(self)
        } else {
            Ok(())
        }
    }

    /// Returns the name of the [`Status`], if it is one of the well known codes.
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        let name = match self {
            Status::SUCCESS => "SUCCESS",
            Status::WARN_UNKNOWN_GLYPH => "WARN_UNKNOWN_GLYPH",
            Status::LOAD_ERROR => "LOAD_ERROR",
            Status::INVALID_PARAMETER => "INVALID_PARAMETER",
            Status::UNSUPPORTED => "UNSUPPORTED",
            Status::BAD_BUFFER_SIZE => "BAD_BUFFER_SIZE",
            Status::BUFFER_TOO_SMALL => "BUFFER_TOO_SMALL",
            Status::NOT_READY => "NOT_READY",
            Status::DEVICE_ERROR => "DEVICE_ERROR",
            Status::OUT_OF_RESOURCES => "OUT_OF_RESOURCES",
            Status::VOLUME_CORRUPTED => "VOLUME_CORRUPTED",
            Status::NO_MEDIA => "NO_MEDIA",
            Status::NOT_FOUND => "NOT_FOUND",
            Status::ACCESS_DENIED => "ACCESS_DENIED",
            Status::ABORTED => "ABORTED",
            Status::SECURITY_VIOLATION => "SECURITY_VIOLATION",
            Status::END_OF_FILE => "END_OF_FILE",
            Status::COMPROMISED_DATA => "COMPROMISED_DATA",
            _ => return None,
        };

        Some(name)
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Status({:#x})", self.0),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A 128-bit globally unique identifier, laid out as UEFI expects it in memory.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(C)]
pub struct Guid {
    data1: u32,
    data2: u16,
    data3: u16,
    data4: [u8; 8],
}

impl Guid {
    /// Creates a [`Guid`] from its four registry-format fields.
    #[must_use]
    pub const fn from_fields(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Guid {
        Guid {
            data1,
            data2,
            data3,
            data4,
        }
    }

    /// Parses a [`Guid`] in `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx` form.
    ///
    /// # Panics
    /// If `str` is not in the expected form. Intended for const contexts through [`guid!`].
    #[must_use]
    pub const fn parse(str: &str) -> Guid {
        let bytes = str.as_bytes();
        assert!(bytes.len() == 36, "GUID must be 36 characters long");
        assert!(
            bytes[8] == b'-' && bytes[13] == b'-' && bytes[18] == b'-' && bytes[23] == b'-',
            "GUID groups must be separated by '-'"
        );

        #[allow(clippy::cast_possible_truncation)]
        let data1 = parse_hex(bytes, 0, 8) as u32;
        #[allow(clippy::cast_possible_truncation)]
        let data2 = parse_hex(bytes, 9, 4) as u16;
        #[allow(clippy::cast_possible_truncation)]
        let data3 = parse_hex(bytes, 14, 4) as u16;

        let mut data4 = [0; 8];
        let mut index = 0;
        while index < 8 {
            let start = if index < 2 {
                19 + index * 2
            } else {
                24 + (index - 2) * 2
            };
            #[allow(clippy::cast_possible_truncation)]
            let byte = parse_hex(bytes, start, 2) as u8;
            data4[index] = byte;
            index += 1;
        }

        Guid {
            data1,
            data2,
            data3,
            data4,
        }
    }
}

/// Parses `count` hexadecimal digits of `bytes`, starting at `start`.
const fn parse_hex(bytes: &[u8], start: usize, count: usize) -> u64 {
    let mut value = 0u64;
    let mut index = start;
    while index < start + count {
        let digit = match bytes[index] {
            b @ b'0'..=b'9' => b - b'0',
            b @ b'a'..=b'f' => b - b'a' + 10,
            b @ b'A'..=b'F' => b - b'A' + 10,
            _ => panic!("GUID contains a non-hexadecimal digit"),
        };
        value = (value << 4) | digit as u64;
        index += 1;
    }

    value
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-",
            self.data1, self.data2, self.data3, self.data4[0], self.data4[1]
        )?;
        for byte in &self.data4[2..] {
            write!(f, "{byte:02x}")?;
        }

        Ok(())
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Creates a [`Guid`] from its string form at compile time.
#[macro_export]
macro_rules! guid {
    ($str:literal) => {{
        const GUID: $crate::datatypes::Guid = $crate::datatypes::Guid::parse($str);
        GUID
    }};
}

/// A unicode codepoint in UCS-2 encoding.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Char16(u16);

impl Char16 {
    /// The NUL character in UCS-2 encoding.
    pub const NUL: Char16 = Char16(0);

    /// Converts `c` to a [`Char16`], returning `None` if `c` is not a valid
    /// UCS-2 character.
    #[must_use]
    pub const fn new(c: char) -> Option<Char16> {
        let codepoint = c as u32;
        if codepoint <= 0xFFFF {
            #[allow(clippy::cast_possible_truncation)]
            Some(Char16(codepoint as u16))
        } else {
            None
        }
    }

    /// Returns the raw UCS-2 code unit.
    #[must_use]
    pub const fn to_u16(self) -> u16 {
        self.0
    }

    /// Encodes the ASCII string `bytes` followed by a [`Char16::NUL`].
    ///
    /// # Panics
    /// If `N` is not `bytes.len() + 1`, or if `bytes` contains non-ASCII or NUL bytes.
    #[must_use]
    pub const fn encode_ascii<const N: usize>(bytes: &[u8]) -> [Char16; N] {
        assert!(bytes.len() + 1 == N);

        let mut output = [Char16::NUL; N];
        let mut index = 0;
        while index < bytes.len() {
            assert!(bytes[index].is_ascii() && bytes[index] != 0);
            output[index] = Char16(bytes[index] as u16);
            index += 1;
        }

        output
    }
}

/// A UCS-2 encoded null-terminated string.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct CStr16([Char16]);

impl CStr16 {
    /// Converts `ptr` into a [`CStr16`] wrapper.
    ///
    /// # Safety
    /// - `ptr` must point to a properly aligned, readable sequence of [`Char16`]s
    ///     terminated by a [`Char16::NUL`].
    /// - The memory must not be modified for the lifetime `'ptr`.
    #[must_use]
    pub unsafe fn from_ptr<'ptr>(ptr: *const Char16) -> &'ptr Self {
        let mut length = 0;

        // SAFETY:
        // `ptr` points to a NUL terminated string, and the NUL has not been passed yet.
        while unsafe { *ptr.add(length) } != Char16::NUL {
            length += 1;
        }

        // SAFETY:
        // `ptr` is valid for reads up to and including the [`Char16::NUL`].
        let slice = unsafe { core::slice::from_raw_parts(ptr, length + 1) };

        // SAFETY:
        // `slice` ends with its only [`Char16::NUL`].
        unsafe { &*(core::ptr::from_ref(slice) as *const Self) }
    }

    /// Converts `slice` into a [`CStr16`] wrapper.
    ///
    /// # Panics
    /// If an interior [`Char16::NUL`] is found or if `slice` does not end
    /// with a [`Char16::NUL`].
    #[must_use]
    pub const fn from_slice(slice: &[Char16]) -> &Self {
        assert!(!slice.is_empty());

        let mut index = 0;
        while index < slice.len() - 1 {
            assert!(slice[index].0 != Char16::NUL.0);
            index += 1;
        }
        assert!(slice[index].0 == Char16::NUL.0);

        // SAFETY:
        // `slice` is a valid [`Char16`] array to underly a [`CStr16`].
        unsafe { &*(core::ptr::from_ref(slice) as *const Self) }
    }

    /// Returns a pointer to this [`CStr16`].
    #[must_use]
    pub const fn as_ptr(&self) -> *const Char16 {
        self.0.as_ptr()
    }

    /// Returns the underlying [`Char16`] slice without the trailing [`Char16::NUL`].
    #[must_use]
    pub fn as_slice(&self) -> &[Char16] {
        &self.0[..self.0.len() - 1]
    }

    /// Returns the underlying [`Char16`] slice including the trailing [`Char16::NUL`].
    #[must_use]
    pub fn as_slice_with_nul(&self) -> &[Char16] {
        &self.0
    }
}

impl fmt::Display for CStr16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in char::decode_utf16(self.as_slice().iter().map(|c| c.0)) {
            fmt::Write::write_char(f, c.unwrap_or(char::REPLACEMENT_CHARACTER))?;
        }

        Ok(())
    }
}

/// Creates a `&'static` [`CStr16`] from an ASCII string literal at compile time.
#[macro_export]
macro_rules! cstr16 {
    ($str:literal) => {{
        const BYTES: &[u8] = $str.as_bytes();
        const ARR: [$crate::datatypes::Char16; BYTES.len() + 1] =
            $crate::datatypes::Char16::encode_ascii(BYTES);
        const REF: &$crate::datatypes::CStr16 = $crate::datatypes::CStr16::from_slice(&ARR);

        REF
    }};
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::format;

    use crate::datatypes::{Char16, Guid, Status};

    #[test]
    fn cstr16_macro() {
        let k = cstr16!("\\EFI");

        assert_eq!(k.as_slice().len(), 4);
        assert_eq!(k.as_slice()[0], Char16::new('\\').unwrap());
        assert_eq!(k.as_slice()[1], Char16::new('E').unwrap());
        assert_eq!(k.as_slice()[3], Char16::new('I').unwrap());
        assert_eq!(k.as_slice_with_nul()[4], Char16::NUL);
        assert_eq!(format!("{k}"), "\\EFI");
    }

    #[test]
    fn guid_parse_matches_fields() {
        let acpi_2 = guid!("8868e871-e4f1-11d3-bc22-0080c73c8881");

        assert_eq!(
            acpi_2,
            Guid::from_fields(
                0x8868_e871,
                0xe4f1,
                0x11d3,
                [0xbc, 0x22, 0x00, 0x80, 0xc7, 0x3c, 0x88, 0x81]
            )
        );
        assert_eq!(format!("{acpi_2}"), "8868e871-e4f1-11d3-bc22-0080c73c8881");
    }

    #[test]
    fn guid_in_memory_layout() {
        let guid = guid!("eb9d2d30-2d88-11d3-9a16-0090273fc14d");

        // SAFETY:
        // [`Guid`] is a 16 byte `repr(C)` structure without padding.
        let bytes: [u8; 16] = unsafe { core::mem::transmute(guid) };
        assert_eq!(&bytes[..4], &0xeb9d_2d30u32.to_ne_bytes());
        assert_eq!(&bytes[8..], &[0x9a, 0x16, 0x00, 0x90, 0x27, 0x3f, 0xc1, 0x4d]);
    }

    #[test]
    fn status_classification() {
        assert!(Status::SUCCESS.into_result().is_ok());
        assert!(Status::WARN_UNKNOWN_GLYPH.warning());
        assert!(Status::WARN_UNKNOWN_GLYPH.into_result().is_ok());
        assert_eq!(Status::NOT_FOUND.into_result(), Err(Status::NOT_FOUND));
        assert!(!Status::UNSUPPORTED.warning());
        assert_eq!(format!("{}", Status::UNSUPPORTED), "UNSUPPORTED");
    }
}
