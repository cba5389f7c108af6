//! Wrappers around the simple file system protocol.

use core::{ffi::c_void, ptr::NonNull};

use uefi::{
    datatypes::{CStr16, Guid, Status},
    protocols::media::{FileProtocol, SimpleFileSystemProtocol},
};

use crate::uefi::protocols::Protocol;

/// A volume formatted with a file system the firmware understands.
pub struct SimpleFileSystem {
    /// Pointer to the interface.
    ptr: NonNull<SimpleFileSystemProtocol>,
}

impl SimpleFileSystem {
    /// Opens the root directory of the volume.
    pub fn open_volume(&mut self) -> Result<File, Status> {
        // SAFETY:
        // All [`SimpleFileSystem`] structures point to a valid [`SimpleFileSystemProtocol`].
        let open_volume_ptr = unsafe { (*self.ptr.as_ptr()).open_volume };

        let mut root = core::ptr::null_mut();

        // SAFETY:
        // `open_volume_ptr` is being called with valid arguments and the correct interface.
        unsafe { open_volume_ptr(self.ptr.as_ptr(), &mut root) }.into_result()?;

        NonNull::new(root)
            .map(|ptr| File { ptr })
            .ok_or(Status::DEVICE_ERROR)
    }
}

impl Protocol for SimpleFileSystem {
    const GUID: Guid = SimpleFileSystemProtocol::GUID;

    unsafe fn from_ffi_ptr(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr.cast::<SimpleFileSystemProtocol>()).map(|ptr| SimpleFileSystem { ptr })
    }
}

/// An open file or directory. Closed on drop.
pub struct File {
    /// Pointer to the interface.
    ptr: NonNull<FileProtocol>,
}

impl File {
    /// Opens the file at `path`, relative to `self`, for reading.
    pub fn open(&mut self, path: &CStr16) -> Result<File, Status> {
        // SAFETY:
        // All [`File`] structures point to a valid [`FileProtocol`].
        let open_ptr = unsafe { (*self.ptr.as_ptr()).open };

        let mut file = core::ptr::null_mut();

        // SAFETY:
        // `open_ptr` is being called with valid arguments and the correct interface.
        unsafe { open_ptr(self.ptr.as_ptr(), &mut file, path.as_ptr(), FileProtocol::MODE_READ, 0) }
            .into_result()?;

        NonNull::new(file)
            .map(|ptr| File { ptr })
            .ok_or(Status::NOT_FOUND)
    }

    /// Reads from the current position into `buffer`, returning the number of bytes read.
    ///
    /// Returns `0` at the end of the file.
    pub fn read(&mut self, buffer: &mut [u8]) -> Result<usize, Status> {
        // SAFETY:
        // All [`File`] structures point to a valid [`FileProtocol`].
        let read_ptr = unsafe { (*self.ptr.as_ptr()).read };

        let mut size = buffer.len();

        // SAFETY:
        // `buffer` is writable for `size` bytes.
        unsafe { read_ptr(self.ptr.as_ptr(), &mut size, buffer.as_mut_ptr().cast()) }
            .into_result()?;

        Ok(size)
    }
}

impl Drop for File {
    fn drop(&mut self) {
        // SAFETY:
        // All [`File`] structures point to a valid [`FileProtocol`].
        let close_ptr = unsafe { (*self.ptr.as_ptr()).close };

        // SAFETY:
        // The file is open and is not used after this call.
        let _ = unsafe { close_ptr(self.ptr.as_ptr()) };
    }
}
