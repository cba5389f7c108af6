//! Wrapper around the loaded image protocol.

use core::{ffi::c_void, ptr::NonNull};

use uefi::{
    datatypes::{Guid, Handle},
    protocols::loaded_image::LoadedImageProtocol,
};

use crate::uefi::protocols::Protocol;

/// Information about a loaded image.
pub struct LoadedImage {
    /// Pointer to the interface.
    ptr: NonNull<LoadedImageProtocol>,
}

impl LoadedImage {
    /// Returns the handle of the device the image was loaded from.
    pub fn device_handle(&self) -> Option<Handle> {
        // SAFETY:
        // All [`LoadedImage`] structures point to a valid [`LoadedImageProtocol`].
        Handle::new(unsafe { (*self.ptr.as_ptr()).device_handle })
    }
}

impl Protocol for LoadedImage {
    const GUID: Guid = LoadedImageProtocol::GUID;

    unsafe fn from_ffi_ptr(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr.cast::<LoadedImageProtocol>()).map(|ptr| LoadedImage { ptr })
    }
}
