//! Wrappers around the UEFI tables.

pub mod boot;
pub mod system;
