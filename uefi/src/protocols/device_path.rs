//! Device path nodes, the firmware's description of where a device or file lives.

use core::mem;

use crate::{
    datatypes::{CStr16, Guid},
    guid,
};

/// The generic header of every device path node.
///
/// A device path is a packed sequence of nodes terminated by an end-of-path node.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(C)]
pub struct DevicePathProtocol {
    /// The major type of this node.
    pub device_type: u8,
    /// The sub-type of this node, interpreted according to [`DevicePathProtocol::device_type`].
    pub sub_type: u8,
    /// The length of this node in bytes, including this header, in little-endian order.
    pub length: [u8; 2],
}

impl DevicePathProtocol {
    /// The [`Guid`] identifying the [`DevicePathProtocol`].
    pub const GUID: Guid = guid!("09576e91-6d3f-11d2-8e39-00a0c969723b");

    /// [`DevicePathProtocol::device_type`] of media nodes.
    pub const TYPE_MEDIA: u8 = 0x04;
    /// [`DevicePathProtocol::device_type`] of end nodes.
    pub const TYPE_END: u8 = 0x7F;

    /// [`DevicePathProtocol::sub_type`] of a media node holding a file path.
    pub const SUB_TYPE_FILE_PATH: u8 = 0x04;
    /// [`DevicePathProtocol::sub_type`] of the node that ends the entire path.
    pub const SUB_TYPE_END_ENTIRE: u8 = 0xFF;

    /// The end-of-path node.
    pub const END: DevicePathProtocol = DevicePathProtocol {
        device_type: DevicePathProtocol::TYPE_END,
        sub_type: DevicePathProtocol::SUB_TYPE_END_ENTIRE,
        length: [4, 0],
    };

    /// Returns the length of this node in bytes.
    #[must_use]
    pub const fn node_length(&self) -> u16 {
        u16::from_le_bytes(self.length)
    }

    /// Returns `true` if this node terminates the entire device path.
    #[must_use]
    pub const fn is_end(&self) -> bool {
        self.device_type == DevicePathProtocol::TYPE_END
            && self.sub_type == DevicePathProtocol::SUB_TYPE_END_ENTIRE
    }

    /// Returns the size in bytes of the device path starting at `ptr`, excluding its end node.
    ///
    /// Returns `None` if a node declares a length smaller than its header.
    ///
    /// # Safety
    /// `ptr` must point to a device path terminated by an end node.
    pub unsafe fn path_size(ptr: *const DevicePathProtocol) -> Option<usize> {
        let mut size = 0;

        loop {
            // SAFETY:
            // `ptr + size` is the start of a node that precedes or is the end node.
            let node = unsafe { ptr.cast::<u8>().add(size).cast::<DevicePathProtocol>().read() };
            if node.is_end() {
                return Some(size);
            }

            let length = usize::from(node.node_length());
            if length < HEADER_SIZE {
                return None;
            }
            size += length;
        }
    }
}

const HEADER_SIZE: usize = mem::size_of::<DevicePathProtocol>();

/// Returns the number of bytes [`write_file_path()`] needs to append a file path node for
/// `path` to a device path of `prefix_size` bytes.
#[must_use]
pub fn file_path_size(prefix_size: usize, path: &CStr16) -> usize {
    prefix_size + HEADER_SIZE + mem::size_of_val(path.as_slice_with_nul()) + HEADER_SIZE
}

/// Writes `prefix`, a file path node holding `path` and an end node to `output`.
///
/// `prefix` is a device path without its end node, usually the path of the volume holding the
/// file. Returns the number of bytes written, or `None` if `output` is too small or `path` does
/// not fit into a single node.
#[must_use]
pub fn write_file_path(prefix: &[u8], path: &CStr16, output: &mut [u8]) -> Option<usize> {
    let path = path.as_slice_with_nul();
    let node_length = u16::try_from(HEADER_SIZE + mem::size_of_val(path)).ok()?;

    let size = prefix.len() + usize::from(node_length) + HEADER_SIZE;
    let output = output.get_mut(..size)?;

    let (head, rest) = output.split_at_mut(prefix.len());
    head.copy_from_slice(prefix);

    let node = DevicePathProtocol {
        device_type: DevicePathProtocol::TYPE_MEDIA,
        sub_type: DevicePathProtocol::SUB_TYPE_FILE_PATH,
        length: node_length.to_le_bytes(),
    };
    let (header, rest) = rest.split_at_mut(HEADER_SIZE);
    header.copy_from_slice(&[node.device_type, node.sub_type, node.length[0], node.length[1]]);

    let (body, end) = rest.split_at_mut(usize::from(node_length) - HEADER_SIZE);
    for (bytes, c) in body.chunks_exact_mut(2).zip(path) {
        bytes.copy_from_slice(&c.to_u16().to_le_bytes());
    }

    let end_node = DevicePathProtocol::END;
    end.copy_from_slice(&[
        end_node.device_type,
        end_node.sub_type,
        end_node.length[0],
        end_node.length[1],
    ]);

    Some(size)
}
