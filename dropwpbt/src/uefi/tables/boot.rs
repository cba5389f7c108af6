//! Wrapper around the UEFI Boot Services Table.

use core::{ffi::c_void, marker::PhantomData, mem::MaybeUninit, ptr::NonNull};

use uefi::{
    datatypes::{Handle, RawEvent, RawHandle, Status},
    protocols::device_path::DevicePathProtocol,
    tables::boot_services::{LocateSearchType, MemoryType, RawBootServicesTable},
};

use crate::uefi::protocols::Protocol;

/// A UEFI Boot Services Table.
pub struct BootServicesTable<'table> {
    /// Pointer to the [`RawBootServicesTable`].
    pub(in crate::uefi::tables) ptr: NonNull<RawBootServicesTable>,
    /// The lifetime of the [`BootServicesTable`].
    pub(in crate::uefi::tables) lifetime: PhantomData<&'table mut RawBootServicesTable>,
}

impl<'table> BootServicesTable<'table> {
    /// Returns a copy of the raw table.
    fn raw(&self) -> RawBootServicesTable {
        // SAFETY:
        // `self.ptr` points to a readable [`RawBootServicesTable`].
        unsafe { self.ptr.as_ptr().read() }
    }

    /// Stalls the processor.
    ///
    /// Stalls execution on the processor for at least `microseconds` microseconds.
    /// Execution of the processor is not yielded for the duration of the call.
    pub fn stall(&self, microseconds: usize) {
        // SAFETY:
        // `stall()` was passed valid arguments.
        let result = unsafe { (self.raw().stall)(microseconds) };

        // According to the UEFI specification, `stall()` may only return [`Status::SUCCESS`].
        debug_assert_eq!(result, Status::SUCCESS);
    }

    /// Allocates `size` zeroed bytes of pool memory of `memory_type`.
    ///
    /// The memory is returned to the pool when the [`PoolBuffer`] is dropped.
    pub fn allocate_pool(
        &self,
        memory_type: MemoryType,
        size: usize,
    ) -> Result<PoolBuffer<'table>, Status> {
        let mut buffer = core::ptr::null_mut();

        // SAFETY:
        // `allocate_pool()` is being called with valid arguments.
        unsafe { (self.raw().allocate_pool)(memory_type, size, &mut buffer) }.into_result()?;

        let ptr = NonNull::new(buffer.cast::<u8>()).ok_or(Status::OUT_OF_RESOURCES)?;

        // SAFETY:
        // The pool returned `size` writable bytes at `ptr`.
        unsafe { ptr.as_ptr().write_bytes(0, size) };

        Ok(PoolBuffer {
            ptr,
            size,
            free_pool: self.raw().free_pool,
            lifetime: PhantomData,
        })
    }

    /// Stops execution until one of `events` is signaled, and returns its index.
    pub fn wait_for_event(&self, events: &[RawEvent]) -> Result<usize, Status> {
        let mut index = MaybeUninit::uninit();

        // SAFETY:
        // `events` is valid for `events.len()` reads.
        unsafe { (self.raw().wait_for_event)(events.len(), events.as_ptr(), index.as_mut_ptr()) }
            .into_result()?;

        // SAFETY:
        // The call succeeded, so `index` has been initialized.
        Ok(unsafe { index.assume_init() })
    }

    /// Queries `handle` to determine if it supports `P`, and returns the interface if it does.
    pub fn handle_protocol<P: Protocol>(&self, handle: Handle) -> Result<P, Status> {
        let mut interface = core::ptr::null_mut();

        // SAFETY:
        // `handle_protocol()` is being called with valid arguments.
        unsafe { (self.raw().handle_protocol)(handle.as_raw(), &P::GUID, &mut interface) }
            .into_result()?;

        // SAFETY:
        // On success, `interface` points to the interface identified by `P::GUID`.
        unsafe { P::from_ffi_ptr(interface) }.ok_or(Status::UNSUPPORTED)
    }

    /// Returns every handle that supports `P`.
    pub fn locate_handle_buffer<P: Protocol>(&self) -> Result<HandleBuffer<'table>, Status> {
        let mut count = 0;
        let mut buffer = core::ptr::null_mut();

        // SAFETY:
        // `locate_handle_buffer()` is being called with valid arguments.
        unsafe {
            (self.raw().locate_handle_buffer)(
                LocateSearchType::BY_PROTOCOL,
                &P::GUID,
                core::ptr::null(),
                &mut count,
                &mut buffer,
            )
        }
        .into_result()?;

        let ptr = NonNull::new(buffer).ok_or(Status::NOT_FOUND)?;

        Ok(HandleBuffer {
            ptr,
            count,
            free_pool: self.raw().free_pool,
            lifetime: PhantomData,
        })
    }

    /// Loads the image at `device_path` into memory, returning the [`Handle`] of the new image.
    pub fn load_image(
        &self,
        parent: Handle,
        device_path: *const DevicePathProtocol,
    ) -> Result<Handle, Status> {
        let mut image = RawHandle::NULL;

        // SAFETY:
        // `device_path` points to a device path terminated by an end node, and no source buffer
        // is passed so that the firmware reads the image itself.
        let status = unsafe {
            (self.raw().load_image)(
                false,
                parent.as_raw(),
                device_path,
                core::ptr::null(),
                0,
                &mut image,
            )
        };

        if let Err(status) = status.into_result() {
            // Images refused for a security violation are still loaded.
            if let Some(image) = Handle::new(image) {
                let _ = self.unload_image(image);
            }
            return Err(status);
        }

        Handle::new(image).ok_or(Status::LOAD_ERROR)
    }

    /// Transfers control to a loaded image's entry point.
    ///
    /// Returns the exit status of the image once it exits.
    pub fn start_image(&self, image: Handle) -> Result<(), Status> {
        // SAFETY:
        // `image` was returned by `load_image()`; the exit data is not requested.
        unsafe {
            (self.raw().start_image)(
                image.as_raw(),
                core::ptr::null_mut(),
                core::ptr::null_mut(),
            )
        }
        .into_result()
    }

    /// Unloads an image that was loaded but not started.
    pub fn unload_image(&self, image: Handle) -> Result<(), Status> {
        // SAFETY:
        // `image` was returned by `load_image()`.
        unsafe { (self.raw().unload_image)(image.as_raw()) }.into_result()
    }
}

/// Memory allocated from the UEFI pool.
pub struct PoolBuffer<'table> {
    ptr: NonNull<u8>,
    size: usize,
    free_pool: unsafe extern "efiapi" fn(buffer: *mut c_void) -> Status,
    lifetime: PhantomData<&'table RawBootServicesTable>,
}

impl PoolBuffer<'_> {
    /// Returns the allocation.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY:
        // The pool returned `size` writable bytes at `ptr`, owned by this buffer.
        unsafe { core::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.size) }
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }
}

impl Drop for PoolBuffer<'_> {
    fn drop(&mut self) {
        // SAFETY:
        // `ptr` was allocated by `allocate_pool()` and is freed only here.
        let _ = unsafe { (self.free_pool)(self.ptr.as_ptr().cast()) };
    }
}

/// A pool allocated array of handles returned by
/// [`BootServicesTable::locate_handle_buffer()`].
pub struct HandleBuffer<'table> {
    ptr: NonNull<RawHandle>,
    count: usize,
    free_pool: unsafe extern "efiapi" fn(buffer: *mut c_void) -> Status,
    lifetime: PhantomData<&'table RawBootServicesTable>,
}

impl HandleBuffer<'_> {
    /// Returns an iterator over the non-null handles in the buffer.
    pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        // SAFETY:
        // The firmware returned `count` handles at `ptr`, owned by this buffer.
        let handles = unsafe { core::slice::from_raw_parts(self.ptr.as_ptr(), self.count) };

        handles.iter().copied().filter_map(Handle::new)
    }
}

impl Drop for HandleBuffer<'_> {
    fn drop(&mut self) {
        // SAFETY:
        // `ptr` was allocated by `locate_handle_buffer()` and is freed only here.
        let _ = unsafe { (self.free_pool)(self.ptr.as_ptr().cast()) };
    }
}
