//! Protocols used to support a simple text-based console.

use core::mem::MaybeUninit;

use crate::{
    datatypes::{Char16, Guid, RawEvent, Status},
    guid,
};

/// A protocol used to obtain input from a text-based console device.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(C)]
pub struct SimpleTextInputProtocol {
    /// Resets the input device, discarding any pending keystrokes.
    pub reset: unsafe extern "efiapi" fn(this: *mut Self, extended_verification: bool) -> Status,
    /// Reads the next keystroke, returning [`Status::NOT_READY`] if none is pending.
    pub read_key_stroke: unsafe extern "efiapi" fn(this: *mut Self, key: *mut InputKey) -> Status,
    /// Event signaled when a keystroke is available.
    pub wait_for_key: RawEvent,
}

impl SimpleTextInputProtocol {
    /// The [`Guid`] identifying the [`SimpleTextInputProtocol`].
    pub const GUID: Guid = guid!("387477c1-69c7-11d2-8e39-00a0c969723b");
}

/// A keystroke read from a [`SimpleTextInputProtocol`].
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(C)]
pub struct InputKey {
    /// The scan code of a non-printable key, or zero.
    pub scan_code: u16,
    /// The UCS-2 character of a printable key, or zero.
    pub unicode_char: u16,
}

/// A protocol used to control text-based devices.
///
/// The minimum supported text mode of devices that support the [`SimpleTextOutputProtocol`]
/// is 80x25 characters.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(C)]
pub struct SimpleTextOutputProtocol {
    /// Reset the device associated with this [`SimpleTextOutputProtocol`].
    pub reset: unsafe extern "efiapi" fn(this: *mut Self, extended_verification: bool) -> Status,
    /// Displays `str` on the device associated with this [`SimpleTextOutputProtocol`]
    /// at the current cursor location.
    pub output_string: unsafe extern "efiapi" fn(this: *mut Self, str: *const Char16) -> Status,
    /// Tests to see if the device associated with this [`SimpleTextOutputProtocol`]
    /// supports `str`.
    pub test_string: unsafe extern "efiapi" fn(this: *mut Self, str: *const Char16) -> Status,
    /// Queries the number of columns and rows supported by `mode`.
    pub query_mode: unsafe extern "efiapi" fn(
        this: *mut Self,
        mode: usize,
        columns: *mut MaybeUninit<usize>,
        rows: *mut MaybeUninit<usize>,
    ) -> Status,
    /// Sets the current mode of the device associated with the [`SimpleTextOutputProtocol`] to `mode`.
    pub set_mode: unsafe extern "efiapi" fn(this: *mut Self, mode: usize) -> Status,
    /// Sets the foreground and background colors of the text that is outputted.
    ///
    /// Bits 0..=3 control the foreground color, and bits 4..=6 control the background color.
    pub set_attribute: unsafe extern "efiapi" fn(this: *mut Self, attribute: usize) -> Status,
    /// Clears the screen with the currently set background color.
    pub clear_screen: unsafe extern "efiapi" fn(this: *mut Self) -> Status,
    /// Sets the current cursor position to `(column, row)`.
    pub set_cursor_position:
        unsafe extern "efiapi" fn(this: *mut Self, column: usize, row: usize) -> Status,
    /// Turns the visibility of the cursor on if `visible` is true, otherwise off.
    pub enable_cursor: unsafe extern "efiapi" fn(this: *mut Self, visible: bool) -> Status,
    /// Pointer to the [`SimpleTextOutputMode`] describing the current state of this [`SimpleTextOutputProtocol`].
    pub mode: *mut SimpleTextOutputMode,
}

impl SimpleTextOutputProtocol {
    /// The [`Guid`] identifying the [`SimpleTextOutputProtocol`].
    pub const GUID: Guid = guid!("387477c2-69c7-11d2-8e39-00a0c969723b");
}

/// Basic values corresponding to an associated [`SimpleTextOutputProtocol`].
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(C)]
pub struct SimpleTextOutputMode {
    /// The number of modes supported by [`SimpleTextOutputProtocol::query_mode`].
    pub max_mode: i32,
    /// The text mode of the device associated with the [`SimpleTextOutputProtocol`].
    pub mode: i32,
    /// The current character output attribute.
    pub attributes: i32,
    /// The cursor's column.
    pub cursor_column: i32,
    /// The cursor's row.
    pub cursor_row: i32,
    /// Whether the cursor is currently visible.
    pub cursor_visible: bool,
}

/// Foreground colors accepted by [`SimpleTextOutputProtocol::set_attribute`].
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(usize)]
pub enum ForegroundColor {
    Black = 0x00,
    Blue = 0x01,
    Green = 0x02,
    Cyan = 0x03,
    Red = 0x04,
    Magenta = 0x05,
    Brown = 0x06,
    LightGray = 0x07,
    DarkGray = 0x08,
    LightBlue = 0x09,
    LightGreen = 0x0A,
    LightCyan = 0x0B,
    LightRed = 0x0C,
    LightMagenta = 0x0D,
    Yellow = 0x0E,
    White = 0x0F,
}

/// Background colors accepted by [`SimpleTextOutputProtocol::set_attribute`].
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(usize)]
pub enum BackgroundColor {
    Black = 0x00,
    Blue = 0x01,
    Green = 0x02,
    Cyan = 0x03,
    Red = 0x04,
    Magenta = 0x05,
    Brown = 0x06,
    LightGray = 0x07,
}
