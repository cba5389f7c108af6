//! Wrappers around device paths.

use core::{ffi::c_void, ptr::NonNull};

use uefi::{
    datatypes::{CStr16, Guid, Status},
    protocols::device_path::{self, DevicePathProtocol},
    tables::boot_services::MemoryType,
};

use crate::uefi::{
    protocols::Protocol,
    tables::boot::{BootServicesTable, PoolBuffer},
};

/// The device path installed on a handle.
pub struct DevicePath {
    /// Pointer to the first node of the path.
    ptr: NonNull<DevicePathProtocol>,
}

impl DevicePath {
    /// Returns the nodes of the path, without its end node.
    pub fn nodes(&self) -> Result<&[u8], Status> {
        // SAFETY:
        // All [`DevicePath`] structures point to a device path terminated by an end node.
        let size = unsafe { DevicePathProtocol::path_size(self.ptr.as_ptr()) }
            .ok_or(Status::VOLUME_CORRUPTED)?;

        // SAFETY:
        // The first `size` bytes of the path are readable nodes.
        Ok(unsafe { core::slice::from_raw_parts(self.ptr.as_ptr().cast::<u8>(), size) })
    }

    /// Builds the path of the file at `path` on the device described by `self`.
    pub fn join<'table>(
        &self,
        boot_services: &BootServicesTable<'table>,
        path: &CStr16,
    ) -> Result<FilePath<'table>, Status> {
        let nodes = self.nodes()?;
        let mut buffer = boot_services.allocate_pool(
            MemoryType::LOADER_DATA,
            device_path::file_path_size(nodes.len(), path),
        )?;

        device_path::write_file_path(nodes, path, buffer.as_mut_slice())
            .ok_or(Status::BAD_BUFFER_SIZE)?;

        Ok(FilePath { buffer })
    }
}

impl Protocol for DevicePath {
    const GUID: Guid = DevicePathProtocol::GUID;

    unsafe fn from_ffi_ptr(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr.cast::<DevicePathProtocol>()).map(|ptr| DevicePath { ptr })
    }
}

/// A device path ending in a file path node, held in pool memory.
pub struct FilePath<'table> {
    buffer: PoolBuffer<'table>,
}

impl FilePath<'_> {
    pub fn as_ptr(&self) -> *const DevicePathProtocol {
        self.buffer.as_ptr().cast()
    }
}
