//! Compile-time configuration.

use log::LevelFilter;
use uefi::{cstr16, datatypes::CStr16};

/// The location of the Windows Boot Manager on an EFI system partition.
pub const BOOT_MANAGER_PATH: &CStr16 = cstr16!("\\EFI\\Microsoft\\Boot\\bootmgfw.efi");

/// The I/O port base of the first serial port.
#[cfg(all(feature = "serial_logging", target_arch = "x86_64"))]
pub const COM1: u16 = 0x3F8;

/// The most verbose level that is logged.
pub const LOG_FILTER: LevelFilter = if cfg!(feature = "verbose") {
    LevelFilter::Trace
} else {
    LevelFilter::Info
};

/// Whether the boot manager is searched for and started once the WPBT is neutralized.
pub const CHAINLOAD: bool = cfg!(feature = "chainload");

/// Whether the boot manager is only inspected instead of started, and key presses are awaited.
pub const DEBUG: bool = cfg!(feature = "debug");
