//! Wrapper functions and definitions around UEFI protocols.

use core::ffi::c_void;

use uefi::datatypes::Guid;

pub mod console;
pub mod device_path;
pub mod file_system;
pub mod loaded_image;

/// A UEFI protocol.
pub trait Protocol: Sized {
    /// The [`Protocol`]'s globally unique ID ([`Guid`]).
    const GUID: Guid;

    /// Create [`Protocol`] from a [`core::ffi::c_void`] pointer.
    ///
    /// Returns `None` if `ptr` is null.
    ///
    /// # Safety
    /// If non-null, the input pointer must point to a valid interface of this protocol.
    unsafe fn from_ffi_ptr(ptr: *mut c_void) -> Option<Self>;
}
