//! Raw definitions of the UEFI datatypes, tables and protocols used to find and patch
//! firmware provided ACPI tables and to start another image.

#![no_std]

pub mod datatypes;
pub mod protocols;
pub mod tables;
