//! Disables the Windows Platform Binary Table before the operating system boots, then
//! optionally hands control to the Windows Boot Manager.

#![no_std]
#![no_main]

use ::uefi::datatypes::{Handle, Status};
use acpi::AcpiError;
use log::{debug, error, info, warn};

use crate::uefi::tables::system::{Boot, SystemTable};

mod chainload;
mod config;
mod logging;
mod uefi;

entry_point!(entry_point);

/// The main logic of dropwpbt.
fn entry_point(image: Handle, system_table: SystemTable<Boot>) -> Status {
    // Without a logger the image still does its work, silently.
    let _ = logging::init();

    info!("dropWPBT");
    info!("https://github.com/Jamesits/dropWPBT");
    match system_table.firmware_vendor() {
        Some(vendor) => info!(
            "Firmware {vendor} Rev {}",
            system_table.firmware_revision()
        ),
        None => info!("Firmware Rev {}", system_table.firmware_revision()),
    }

    let status = drop_wpbt(&system_table);

    if config::DEBUG {
        info!("dropWPBT done, press any key to continue");
        wait_for_key(&system_table);
    } else {
        info!("dropWPBT done");
    }

    if config::CHAINLOAD {
        if let Err(status) = chainload::chainload(&system_table, image, config::BOOT_MANAGER_PATH) {
            warn!("Boot manager not started: {status}");
        }
    }

    status
}

/// Neutralizes every WPBT and maps the outcome to the exit status of the image.
fn drop_wpbt(system_table: &SystemTable<Boot>) -> Status {
    // SAFETY:
    // Boot services are active, so the configuration tables and the ACPI tables they lead to are
    // identity mapped and not modified by anything else.
    let result = unsafe {
        acpi::drop_wpbt(system_table.configuration_tables(), |found| {
            debug!("Neutralized table at {:#x}", found.address);
        })
    };

    match result {
        Ok(summary) => {
            if summary.neutralized == 0 {
                info!("No WPBT table found");
            }
            Status::SUCCESS
        }
        Err(error @ (AcpiError::RootPointerNotFound | AcpiError::ExtendedTableNotFound)) => {
            error!("ERROR: {error}");
            Status::UNSUPPORTED
        }
        Err(error @ AcpiError::MalformedExtendedTable) => {
            error!("ERROR: {error}");
            Status::COMPROMISED_DATA
        }
    }
}

/// Blocks until a key is pressed, or for a few seconds if there is no console input.
fn wait_for_key(system_table: &SystemTable<Boot>) {
    let boot_services = system_table.boot_services();

    let Some(mut stdin) = system_table.stdin() else {
        boot_services.stall(5_000_000);
        return;
    };

    let _ = stdin.reset();
    if boot_services
        .wait_for_event(&[stdin.wait_for_key_event()])
        .is_err()
    {
        boot_services.stall(5_000_000);
    }
    let _ = stdin.read_key();
}

/// Handles panics occurring while dropwpbt runs.
#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    error!("{info}");

    loop {
        core::hint::spin_loop();
    }
}
