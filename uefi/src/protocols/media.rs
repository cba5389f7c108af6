//! Protocols that provide access to file systems.

use core::ffi::c_void;

use crate::{
    datatypes::{Char16, Guid, Status},
    guid,
};

/// Provides access to the root directory of a volume.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(C)]
pub struct SimpleFileSystemProtocol {
    /// The revision of this protocol.
    pub revision: u64,
    /// Opens the root directory of the volume, storing the handle in `root`.
    pub open_volume:
        unsafe extern "efiapi" fn(this: *mut Self, root: *mut *mut FileProtocol) -> Status,
}

impl SimpleFileSystemProtocol {
    /// The [`Guid`] identifying the [`SimpleFileSystemProtocol`].
    pub const GUID: Guid = guid!("964e5b22-6459-11d2-8e39-00a0c969723b");
}

/// An open file or directory on a volume.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(C)]
pub struct FileProtocol {
    /// The revision of this protocol.
    pub revision: u64,
    /// Opens `file_name` relative to `this`, storing the new handle in `new_handle`.
    pub open: unsafe extern "efiapi" fn(
        this: *mut Self,
        new_handle: *mut *mut FileProtocol,
        file_name: *const Char16,
        open_mode: u64,
        attributes: u64,
    ) -> Status,
    /// Closes the file handle.
    pub close: unsafe extern "efiapi" fn(this: *mut Self) -> Status,
    /// Closes and deletes the file.
    pub delete: unsafe extern "efiapi" fn(),
    /// Reads up to `*buffer_size` bytes into `buffer`, updating `buffer_size` with the
    /// number of bytes read.
    pub read: unsafe extern "efiapi" fn(
        this: *mut Self,
        buffer_size: *mut usize,
        buffer: *mut c_void,
    ) -> Status,
    /// Writes data to the file.
    pub write: unsafe extern "efiapi" fn(),
    /// Returns the current file position.
    pub get_position: unsafe extern "efiapi" fn(),
    /// Sets the current file position.
    pub set_position: unsafe extern "efiapi" fn(),
    /// Returns information of type `information_type` about the file.
    pub get_info: unsafe extern "efiapi" fn(
        this: *mut Self,
        information_type: *const Guid,
        buffer_size: *mut usize,
        buffer: *mut c_void,
    ) -> Status,
    /// Sets information about the file.
    pub set_info: unsafe extern "efiapi" fn(),
    /// Flushes modified data to the device.
    pub flush: unsafe extern "efiapi" fn(),
}

impl FileProtocol {
    /// Open the file for reading.
    pub const MODE_READ: u64 = 0x0000_0000_0000_0001;

    /// The file is a directory.
    pub const ATTRIBUTE_DIRECTORY: u64 = 0x0000_0000_0000_0010;
}
