//! Definitions of the UEFI protocols used by the application.

pub mod console;
pub mod device_path;
pub mod loaded_image;
pub mod media;
