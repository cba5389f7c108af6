//! Searching the volumes for the Windows Boot Manager and starting it.

use log::{debug, error, info, warn};
use uefi::datatypes::{CStr16, Handle, Status};

use crate::uefi::{
    protocols::{
        device_path::DevicePath, file_system::SimpleFileSystem, loaded_image::LoadedImage,
    },
    tables::{
        boot::BootServicesTable,
        system::{Boot, SystemTable},
    },
};

/// The first bytes of every PE image.
const IMAGE_MAGIC: [u8; 2] = *b"MZ";

/// Starts the image at `path` on the volume holding this image, or on any other volume.
///
/// Only returns if the image could not be found or started, or after it returned control.
///
/// # Errors
/// [`Status::NOT_FOUND`] if no volume holds a file at `path`, or the status of the last attempt
/// to start one.
pub fn chainload(
    system_table: &SystemTable<Boot>,
    image: Handle,
    path: &CStr16,
) -> Result<(), Status> {
    let boot_services = system_table.boot_services();

    // Keystrokes meant for this image must not reach the boot manager.
    if let Some(mut stdin) = system_table.stdin() {
        let _ = stdin.reset();
    }

    info!("Searching for {path}");
    let own_volume = boot_services
        .handle_protocol::<LoadedImage>(image)
        .ok()
        .and_then(|loaded_image| loaded_image.device_handle());

    if let Some(volume) = own_volume {
        match try_volume(&boot_services, image, volume, path) {
            Err(Status::NOT_FOUND) => {}
            result => return result,
        }
    }
    warn!("{path} not found on the current volume, searching all volumes");

    let volumes = boot_services.locate_handle_buffer::<SimpleFileSystem>()?;
    let mut result = Err(Status::NOT_FOUND);
    for volume in volumes.handles().filter(|&volume| Some(volume) != own_volume) {
        match try_volume(&boot_services, image, volume, path) {
            Err(Status::NOT_FOUND) => {}
            Err(status) => result = Err(status),
            Ok(()) => return Ok(()),
        }
    }

    if result == Err(Status::NOT_FOUND) {
        error!("{path} not found on any volume");
    }
    result
}

/// Looks for the file at `path` on `volume` and starts it.
fn try_volume(
    boot_services: &BootServicesTable<'_>,
    image: Handle,
    volume: Handle,
    path: &CStr16,
) -> Result<(), Status> {
    let mut file_system = match boot_services.handle_protocol::<SimpleFileSystem>(volume) {
        Ok(file_system) => file_system,
        Err(status) => {
            debug!("Volume {volume:?} has no file system: {status}");
            return Err(Status::NOT_FOUND);
        }
    };

    let mut root = match file_system.open_volume() {
        Ok(root) => root,
        Err(status) => {
            debug!("Volume {volume:?} could not be opened: {status}");
            return Err(Status::NOT_FOUND);
        }
    };

    let mut file = match root.open(path) {
        Ok(file) => file,
        Err(Status::NOT_FOUND) => return Err(Status::NOT_FOUND),
        Err(status) => {
            warn!("{path} could not be opened on volume {volume:?}: {status}");
            return Err(Status::NOT_FOUND);
        }
    };
    info!("{path} found on volume {volume:?}");

    if crate::config::DEBUG {
        let mut magic = [0; 2];
        let read = file.read(&mut magic)?;
        if magic[..read] == IMAGE_MAGIC {
            info!("{path} starts with \"MZ\", not started in debug builds");
        } else {
            warn!("{path} is not a PE image");
        }
        return Ok(());
    }
    drop(file);
    drop(root);

    let device_path = boot_services.handle_protocol::<DevicePath>(volume)?;
    let file_path = device_path.join(boot_services, path)?;

    let loaded = boot_services.load_image(image, file_path.as_ptr()).inspect_err(|status| {
        error!("{path} could not be loaded: {status}");
    })?;

    info!("Starting {path}");
    boot_services.start_image(loaded).inspect_err(|status| {
        error!("{path} returned {status}");
    })
}
