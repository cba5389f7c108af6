//! The protocol describing a loaded image.

use core::ffi::c_void;

use crate::{
    datatypes::{Guid, RawHandle, Status},
    guid,
    protocols::device_path::DevicePathProtocol,
    tables::{boot_services::MemoryType, system::RawSystemTable},
};

/// Information about a loaded image, installed on every image handle.
#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct LoadedImageProtocol {
    /// The revision of this structure.
    pub revision: u32,
    /// The image that loaded this image, or null for images loaded by the firmware.
    pub parent_handle: RawHandle,
    /// The system table handed to the image.
    pub system_table: *mut RawSystemTable,
    /// The device from which the image was loaded.
    pub device_handle: RawHandle,
    /// The file path of the image, relative to [`LoadedImageProtocol::device_handle`].
    pub file_path: *mut DevicePathProtocol,
    /// Reserved.
    pub _reserved: *mut c_void,
    /// The size, in bytes, of [`LoadedImageProtocol::load_options`].
    pub load_options_size: u32,
    /// The image's load options.
    pub load_options: *mut c_void,
    /// The base address of the image in memory.
    pub image_base: *mut c_void,
    /// The size, in bytes, of the image in memory.
    pub image_size: u64,
    /// The memory type of the image's code sections.
    pub image_code_type: MemoryType,
    /// The memory type of the image's data sections.
    pub image_data_type: MemoryType,
    /// Unloads the image.
    pub unload: unsafe extern "efiapi" fn(image_handle: RawHandle) -> Status,
}

impl LoadedImageProtocol {
    /// The [`Guid`] identifying the [`LoadedImageProtocol`].
    pub const GUID: Guid = guid!("5b1b31a1-9562-11d2-8e3f-00a0c969723b");
}
