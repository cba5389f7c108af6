//! Definitions and interfaces for interacting with the UEFI boot services table.

use core::ffi::c_void;

use crate::{
    datatypes::{Char16, Guid, RawEvent, RawHandle, Status},
    protocols::device_path::DevicePathProtocol,
    tables::{Header, TableHeaderValidationError},
};

/// The type of memory backing an allocation.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct MemoryType(pub u32);

impl MemoryType {
    /// Memory available to the image as data while boot services are active.
    pub const LOADER_DATA: MemoryType = MemoryType(2);
    /// Memory allocated by boot services drivers as data.
    pub const BOOT_SERVICES_DATA: MemoryType = MemoryType(4);
}

/// The search performed by [`RawBootServicesTable::locate_handle_buffer`].
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct LocateSearchType(pub u32);

impl LocateSearchType {
    /// Every handle in the system.
    pub const ALL_HANDLES: LocateSearchType = LocateSearchType(0);
    /// Handles registered through a protocol notification.
    pub const BY_REGISTER_NOTIFY: LocateSearchType = LocateSearchType(1);
    /// Handles that support the given protocol.
    pub const BY_PROTOCOL: LocateSearchType = LocateSearchType(2);
}

/// A container for function pointers to interact with the UEFI environment.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(C)]
pub struct RawBootServicesTable {
    /// The [`Header`] used to check validity of this [`RawBootServicesTable`].
    pub header: Header,

    /// Raises the task priority level.
    pub raise_tpl: unsafe extern "efiapi" fn(),
    /// Restores/lowers the task priority level.
    pub restore_tpl: unsafe extern "efiapi" fn(),

    /// Allocates pages of a particular type.
    pub allocate_pages: unsafe extern "efiapi" fn(),
    /// Frees allocated pages.
    pub free_pages: unsafe extern "efiapi" fn(),
    /// Returns the current boot services memory map and memory map key.
    pub get_memory_map: unsafe extern "efiapi" fn(),
    /// Allocates `size` bytes of `pool_type` memory, storing the address in `buffer`.
    pub allocate_pool: unsafe extern "efiapi" fn(
        pool_type: MemoryType,
        size: usize,
        buffer: *mut *mut c_void,
    ) -> Status,
    /// Frees memory returned by [`RawBootServicesTable::allocate_pool`].
    pub free_pool: unsafe extern "efiapi" fn(buffer: *mut c_void) -> Status,

    /// Creates a general purpose event structure.
    pub create_event: unsafe extern "efiapi" fn(),
    /// Sets an event to be signaled at a particular time.
    pub set_timer: unsafe extern "efiapi" fn(),
    /// Stops execution until one of `events` is signaled, storing its position in `index`.
    pub wait_for_event: unsafe extern "efiapi" fn(
        event_count: usize,
        events: *const RawEvent,
        index: *mut usize,
    ) -> Status,
    /// Signals an event.
    pub signal_event: unsafe extern "efiapi" fn(),
    /// Closes and frees an event structure.
    pub close_event: unsafe extern "efiapi" fn(),
    /// Checks whether an event is in the signaled state.
    pub check_event: unsafe extern "efiapi" fn(),

    /// Installs a protocol interface on a device handle.
    pub install_protocol_interface: unsafe extern "efiapi" fn(),
    /// Reinstalls a protocol interface on a device handle.
    pub reinstall_protocol_interface: unsafe extern "efiapi" fn(),
    /// Removes a protocol interface from a device handle.
    pub uninstall_protocol_interface: unsafe extern "efiapi" fn(),
    /// Queries `handle` to determine if it supports `protocol`, storing the interface in
    /// `interface`.
    pub handle_protocol: unsafe extern "efiapi" fn(
        handle: RawHandle,
        protocol: *const Guid,
        interface: *mut *mut c_void,
    ) -> Status,
    /// Must be null.
    pub _reserved: *mut (),
    /// Registers an event that is to be signaled whenever an interface is installed for a
    /// specified protocol.
    pub register_protocol_notify: unsafe extern "efiapi" fn(),
    /// Returns an array of handles that support a specified protocol.
    pub locate_handle: unsafe extern "efiapi" fn(),
    /// Locates all devices on a device path that support a specified protocol and returns
    /// the handle to the device that is closest to the path.
    pub locate_device_path: unsafe extern "efiapi" fn(),
    /// Adds, updates, or removes a configuration table from the UEFI [`RawSystemTable`][rst].
    ///
    /// [rst]: crate::tables::system::RawSystemTable
    pub install_configuration_table: unsafe extern "efiapi" fn(),

    /// Loads an EFI image into memory, storing the handle of the new image in `image_handle`.
    ///
    /// If `source_buffer` is null, the image is loaded from `device_path`.
    pub load_image: unsafe extern "efiapi" fn(
        boot_policy: bool,
        parent_image_handle: RawHandle,
        device_path: *const DevicePathProtocol,
        source_buffer: *const c_void,
        source_size: usize,
        image_handle: *mut RawHandle,
    ) -> Status,
    /// Transfers control to a loaded image's entry point.
    pub start_image: unsafe extern "efiapi" fn(
        image_handle: RawHandle,
        exit_data_size: *mut usize,
        exit_data: *mut *mut Char16,
    ) -> Status,
    /// Exits the image's entry point.
    pub exit: unsafe extern "efiapi" fn(),
    /// Unloads an image that was loaded but not started, or that exited.
    pub unload_image: unsafe extern "efiapi" fn(image_handle: RawHandle) -> Status,
    /// Terminates boot services.
    pub exit_boot_services: unsafe extern "efiapi" fn(),

    /// Returns a monotonically increasing count for the platform.
    pub get_next_monotonic_count: unsafe extern "efiapi" fn(),
    /// Stalls the processor.
    pub stall: unsafe extern "efiapi" fn(microseconds: usize) -> Status,
    /// Resets and sets the watchdog timer used during boot services.
    pub set_watchdog_timer: unsafe extern "efiapi" fn(),

    /// Uses a set of precedence rules to find the best set of drivers to manage
    /// a controller.
    pub connect_controller: unsafe extern "efiapi" fn(),
    /// Informs a set of drivers to stop managing a controller.
    pub disconnect_controller: unsafe extern "efiapi" fn(),

    /// Adds elements to a list of agents consuming a protocol interface.
    pub open_protocol: unsafe extern "efiapi" fn(),
    /// Removes elements from the list of agents consuming a protocol interface.
    pub close_protocol: unsafe extern "efiapi" fn(),
    /// Retrieves the list of agents that are currently consuming a protocol interface.
    pub open_protocol_information: unsafe extern "efiapi" fn(),

    /// Retrieves the list of protocols installed on a handle. The return buffer is
    /// allocated automatically.
    pub protocols_per_handle: unsafe extern "efiapi" fn(),
    /// Retrieves the list of handles from the handle database that meet the search
    /// criteria. The returned buffer must be released with [`RawBootServicesTable::free_pool`].
    pub locate_handle_buffer: unsafe extern "efiapi" fn(
        search_type: LocateSearchType,
        protocol: *const Guid,
        search_key: *const c_void,
        handle_count: *mut usize,
        buffer: *mut *mut RawHandle,
    ) -> Status,
    /// Finds the first handle in the handle database that supports the requested protocol.
    pub locate_protocol: unsafe extern "efiapi" fn(),
    /// Installs one or more protocol interfaces onto a handle.
    pub install_multiple_protocol_interface: unsafe extern "efiapi" fn(),
    /// Removes one or more protocol interfaces from a handle.
    pub uninstall_multiple_protocol_interface: unsafe extern "efiapi" fn(),

    /// Computes and returns a 32-bit CRC for a data buffer.
    pub calculate_crc32: unsafe extern "efiapi" fn(),

    /// Copies the contents of one buffer to another buffer.
    pub copy_mem: unsafe extern "efiapi" fn(),
    /// Fills a buffer with a specified value.
    pub set_mem: unsafe extern "efiapi" fn(),
    /// Creates an event structure as part of an event group.
    pub create_event_ex: unsafe extern "efiapi" fn(),
}

impl RawBootServicesTable {
    /// The 64-bit signature that identifies the table as a UEFI [`RawBootServicesTable`].
    pub const SIGNATURE: u64 = 0x5652_4553_544f_4f42;

    /// Validates that the provided pointer points to a valid UEFI [`RawBootServicesTable`].
    ///
    /// # Safety
    /// - `ptr` must be null or valid for reads of `core::mem::size_of::<Header>()` bytes.
    /// - `ptr` must be properly aligned.
    ///
    /// # Errors
    /// See [`Header::validate()`].
    pub unsafe fn validate(
        ptr: *const RawBootServicesTable,
    ) -> Result<(), TableHeaderValidationError> {
        // SAFETY:
        // The invariants of `Header::validate()` are the same as this function's invariants.
        unsafe { Header::validate(RawBootServicesTable::SIGNATURE, ptr.cast::<Header>()) }
    }
}
