//! Synthetic firmware memory for host tests.

extern crate std;

use core::ffi::c_void;
use std::{boxed::Box, vec, vec::Vec};

use uefi::{
    datatypes::Guid,
    tables::config::{self, ConfigurationTable},
};

use crate::{checksum, rsdp::Rsdp, sdt::SdtHeader};

/// Owns the buffers that stand in for firmware tables.
///
/// Buffers are boxed so that their addresses stay fixed while more are added.
pub struct Firmware {
    buffers: Vec<Box<[u8]>>,
    configuration: Vec<ConfigurationTable>,
}

impl Firmware {
    pub fn new() -> Firmware {
        Firmware {
            buffers: Vec::new(),
            configuration: Vec::new(),
        }
    }

    /// Builds a description table with a valid checksum and `body_length` patterned body bytes.
    pub fn table(signature: [u8; 4], body_length: usize) -> Box<[u8]> {
        let length = SdtHeader::SIZE + body_length;
        let mut bytes = vec![0u8; length];

        bytes[0..4].copy_from_slice(&signature);
        bytes[4..8].copy_from_slice(&u32::try_from(length).unwrap().to_le_bytes());
        bytes[8] = 1;
        bytes[10..16].copy_from_slice(b"DWPBT ");
        bytes[16..24].copy_from_slice(b"TESTTABL");
        bytes[24..28].copy_from_slice(&1u32.to_le_bytes());
        bytes[28..32].copy_from_slice(b"TEST");
        bytes[32..36].copy_from_slice(&1u32.to_le_bytes());
        for (index, byte) in bytes[SdtHeader::SIZE..].iter_mut().enumerate() {
            *byte = u8::try_from(index % 251).unwrap();
        }
        bytes[9] = checksum::checksum(&bytes);

        bytes.into_boxed_slice()
    }

    /// Builds an XSDT pointing at `entries`.
    pub fn xsdt(entries: &[u64]) -> Box<[u8]> {
        let mut bytes = Firmware::table(*b"XSDT", entries.len() * 8).into_vec();

        for (index, entry) in entries.iter().enumerate() {
            let offset = SdtHeader::SIZE + index * 8;
            bytes[offset..offset + 8].copy_from_slice(&entry.to_le_bytes());
        }
        bytes[9] = 0;
        bytes[9] = checksum::checksum(&bytes);

        bytes.into_boxed_slice()
    }

    /// Builds a root pointer of `revision`, sized as that revision defines it.
    pub fn rsdp(revision: u8, xsdt_address: u64) -> Box<[u8]> {
        let length = if revision >= Rsdp::EXTENDED_REVISION {
            36
        } else {
            20
        };
        let mut bytes = vec![0u8; length];

        bytes[0..8].copy_from_slice(&Rsdp::SIGNATURE);
        bytes[9..15].copy_from_slice(b"DWPBT ");
        bytes[15] = revision;
        bytes[8] = checksum::checksum(&bytes[..20]);
        if length == 36 {
            bytes[20..24].copy_from_slice(&36u32.to_le_bytes());
            bytes[24..32].copy_from_slice(&xsdt_address.to_le_bytes());
            bytes[32] = checksum::checksum(&bytes);
        }

        bytes.into_boxed_slice()
    }

    /// Keeps `bytes` alive and returns their address.
    pub fn place(&mut self, mut bytes: Box<[u8]>) -> u64 {
        let address = bytes.as_mut_ptr() as usize as u64;
        self.buffers.push(bytes);
        address
    }

    /// Adds a configuration table entry pointing at `address`.
    pub fn install(&mut self, vendor_guid: Guid, address: u64) {
        self.configuration.push(ConfigurationTable {
            vendor_guid,
            vendor_table: usize::try_from(address).unwrap() as *mut c_void,
        });
    }

    /// Places a full ACPI 2.0 table set whose XSDT lists tables with `signatures`, in order.
    ///
    /// Returns the addresses of the listed tables.
    pub fn with_tables(signatures: &[[u8; 4]]) -> (Firmware, Vec<u64>) {
        let mut firmware = Firmware::new();

        let tables = signatures
            .iter()
            .map(|&signature| firmware.place(Firmware::table(signature, 24)))
            .collect::<Vec<_>>();
        let xsdt = firmware.place(Firmware::xsdt(&tables));
        let rsdp = firmware.place(Firmware::rsdp(2, xsdt));
        firmware.install(config::ACPI_2, rsdp);

        (firmware, tables)
    }

    pub fn configuration(&self) -> &[ConfigurationTable] {
        &self.configuration
    }

    /// Returns the buffer placed at `address`.
    pub fn bytes(&self, address: u64) -> &[u8] {
        self.buffers
            .iter()
            .find(|buffer| buffer.as_ptr() as usize as u64 == address)
            .expect("no buffer placed at address")
    }

    /// Returns a mutable view of the buffer placed at `address`.
    pub fn bytes_mut(&mut self, address: u64) -> &mut [u8] {
        self.buffers
            .iter_mut()
            .find(|buffer| buffer.as_ptr() as usize as u64 == address)
            .expect("no buffer placed at address")
    }

    /// Returns a copy of every placed buffer, in placement order.
    pub fn snapshot(&self) -> Vec<Vec<u8>> {
        self.buffers.iter().map(|buffer| buffer.to_vec()).collect()
    }
}
