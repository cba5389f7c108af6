//! Wrapper around the UEFI System Table.

use core::{marker::PhantomData, ptr::NonNull};

use uefi::{
    datatypes::CStr16,
    tables::{
        boot_services::RawBootServicesTable, config::ConfigurationTable, system::RawSystemTable,
        TableHeaderValidationError,
    },
};

use crate::uefi::{
    protocols::console::text::{SimpleTextInput, SimpleTextOutput},
    tables::boot::BootServicesTable,
};

/// A UEFI System Table.
pub struct SystemTable<T> {
    /// Pointer to the [`RawSystemTable`].
    ptr: NonNull<RawSystemTable>,
    /// Pointer to the validated [`RawBootServicesTable`].
    boot_services: NonNull<RawBootServicesTable>,
    /// The view of the [`RawSystemTable`].
    view: PhantomData<T>,
}

impl SystemTable<Boot> {
    /// Returns a [`SystemTable`], validating that the `ptr` points to a valid [`RawSystemTable`] as much as possible.
    ///
    /// # Safety
    /// - `ptr` must point to a readable region of memory that is at least `core::mem::size_of::<RawSystemTable>()` bytes.
    /// - If non-null, the boot services pointer of the table must point to a readable region of memory that is at
    ///     least `core::mem::size_of::<RawBootServicesTable>()` bytes.
    ///
    /// # Errors
    /// The [`TableHeaderValidationError`] of the first table that failed validation.
    pub unsafe fn new(
        ptr: NonNull<RawSystemTable>,
    ) -> Result<SystemTable<Boot>, TableHeaderValidationError> {
        // SAFETY:
        // `ptr` is readable for the size of a [`RawSystemTable`], which starts with its header.
        unsafe { RawSystemTable::validate(ptr.as_ptr()) }?;

        // SAFETY:
        // `ptr` points to a readable region of memory that is at least `core::mem::size_of::<RawSystemTable>()` bytes,
        // which is large enough that reading `(*ptr).boot_services` is valid.
        let boot_services_ptr = unsafe { (*ptr.as_ptr()).boot_services };

        // SAFETY:
        // If non-null, `boot_services_ptr` is readable for the size of a [`RawBootServicesTable`].
        unsafe { RawBootServicesTable::validate(boot_services_ptr) }?;

        let boot_services =
            NonNull::new(boot_services_ptr).ok_or(TableHeaderValidationError::NullPointer)?;

        Ok(SystemTable {
            ptr,
            boot_services,
            view: PhantomData,
        })
    }

    /// Returns a [`SystemTable`] for a table that [`SystemTable::new()`] has accepted before.
    ///
    /// # Safety
    /// `ptr` must have been validated by [`SystemTable::new()`], and boot services must not have been exited.
    pub(in crate::uefi) unsafe fn from_validated(
        ptr: NonNull<RawSystemTable>,
    ) -> Option<SystemTable<Boot>> {
        // SAFETY:
        // `ptr` points to a valid [`RawSystemTable`].
        let boot_services = NonNull::new(unsafe { (*ptr.as_ptr()).boot_services })?;

        Some(SystemTable {
            ptr,
            boot_services,
            view: PhantomData,
        })
    }

    /// Returns the associated [`BootServicesTable`].
    pub fn boot_services(&self) -> BootServicesTable<'_> {
        BootServicesTable {
            ptr: self.boot_services,
            lifetime: PhantomData,
        }
    }

    /// Returns the name of the firmware vendor.
    pub fn firmware_vendor(&self) -> Option<&CStr16> {
        // SAFETY:
        // `self.ptr` points to a valid [`RawSystemTable`].
        let vendor_ptr = unsafe { (*self.ptr.as_ptr()).firmware_vendor };
        if vendor_ptr.is_null() {
            return None;
        }

        // SAFETY:
        // The firmware vendor is a NUL terminated string that lives as long as the table.
        Some(unsafe { CStr16::from_ptr(vendor_ptr) })
    }

    /// Returns the vendor specific revision of the firmware.
    pub fn firmware_revision(&self) -> u32 {
        // SAFETY:
        // `self.ptr` points to a valid [`RawSystemTable`].
        unsafe { (*self.ptr.as_ptr()).firmware_revision }
    }

    /// Returns the [`SimpleTextOutput`] of the active console output device.
    pub fn stdout(&self) -> Option<SimpleTextOutput> {
        // SAFETY:
        // `self.ptr` points to a valid [`RawSystemTable`].
        let console_out = unsafe { (*self.ptr.as_ptr()).console_out };

        NonNull::new(console_out).map(SimpleTextOutput::new)
    }

    /// Returns the [`SimpleTextInput`] of the active console input device.
    pub fn stdin(&self) -> Option<SimpleTextInput> {
        // SAFETY:
        // `self.ptr` points to a valid [`RawSystemTable`].
        let console_in = unsafe { (*self.ptr.as_ptr()).console_in };

        NonNull::new(console_in).map(SimpleTextInput::new)
    }

    /// Returns the configuration tables installed by the firmware.
    pub fn configuration_tables(&self) -> &[ConfigurationTable] {
        // SAFETY:
        // `self.ptr` points to a valid [`RawSystemTable`].
        let (count, tables) = unsafe {
            let table = &*self.ptr.as_ptr();
            (table.table_entry_count, table.configuration_tables)
        };

        if count == 0 || tables.is_null() {
            return &[];
        }

        // SAFETY:
        // The firmware provides `count` contiguous [`ConfigurationTable`]s at `tables`, which are
        // not modified while boot services are active.
        unsafe { core::slice::from_raw_parts(tables, count) }
    }
}

/// Marker struct associated with the boot view of the UEFI System Table.
pub struct Boot;
impl SystemTableView for Boot {}

/// A marker trait used to mark different perspectives of the UEFI System Table.
pub trait SystemTableView {}
