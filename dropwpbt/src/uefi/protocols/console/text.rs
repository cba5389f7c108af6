//! Rust-y wrappers around text input/output protocols.

use core::{ffi::c_void, fmt, mem::MaybeUninit, ptr::NonNull};

use uefi::{
    datatypes::{Char16, CStr16, RawEvent, Status},
    protocols::console::text::{
        BackgroundColor, ForegroundColor, InputKey, SimpleTextInputProtocol,
        SimpleTextOutputMode, SimpleTextOutputProtocol,
    },
};

use crate::uefi::protocols::Protocol;

/// Interface for text-based output devices.
pub struct SimpleTextOutput {
    /// Pointer to the interface.
    ptr: NonNull<SimpleTextOutputProtocol>,
}

impl SimpleTextOutput {
    /// Wraps the interface at `ptr`.
    pub(in crate::uefi) fn new(ptr: NonNull<SimpleTextOutputProtocol>) -> SimpleTextOutput {
        SimpleTextOutput { ptr }
    }

    /// Writes the provided `str` to the output device.
    ///
    /// The [`CStr16`] is displayed at the current cursor location
    /// on the output device(s) and the cursor is advanced according to listed rules.
    pub fn output_string(&mut self, str: &CStr16) -> Result<(), Status> {
        // SAFETY:
        // All [`SimpleTextOutput`] structures point to a valid [`SimpleTextOutputProtocol`].
        let output_string_ptr = unsafe { (*self.ptr.as_ptr()).output_string };

        // SAFETY:
        // `output_string_ptr` is being called with valid arguments and the correct interface.
        unsafe { output_string_ptr(self.ptr.as_ptr(), str.as_ptr()) }.into_result()
    }

    /// Sets the background and foreground colors for the [`SimpleTextOutput::output_string()`] function.
    pub fn set_attribute(
        &mut self,
        background: BackgroundColor,
        foreground: ForegroundColor,
    ) -> Result<(), Status> {
        self.set_raw_attribute(((background as usize) << 4) | foreground as usize)
    }

    /// Sets an attribute previously read from [`SimpleTextOutputMode::attributes`].
    pub fn set_raw_attribute(&mut self, attribute: usize) -> Result<(), Status> {
        // SAFETY:
        // All [`SimpleTextOutput`] structures point to a valid [`SimpleTextOutputProtocol`].
        let set_attribute_ptr = unsafe { (*self.ptr.as_ptr()).set_attribute };

        // SAFETY:
        // `set_attribute_ptr` is being called with valid arguments and the correct interface.
        unsafe { set_attribute_ptr(self.ptr.as_ptr(), attribute) }.into_result()
    }

    /// Returns a read-only view of various information about the state of the [`SimpleTextOutput`] device.
    pub fn info(&self) -> Option<&SimpleTextOutputMode> {
        // SAFETY:
        // All [`SimpleTextOutput`] structures point to a valid [`SimpleTextOutputProtocol`].
        let mode_ptr = unsafe { (*self.ptr.as_ptr()).mode };

        // SAFETY:
        // If non-null, `mode` points to the mode of the device, which lives as long as the interface.
        unsafe { mode_ptr.as_ref() }
    }
}

impl fmt::Write for SimpleTextOutput {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut encoder = Encoder {
            output: self,
            buffer: [Char16::NUL; BUFFER_LENGTH + 1],
            length: 0,
        };

        for c in s.chars() {
            match c {
                '\0' => continue,
                '\n' => {
                    encoder.push('\r')?;
                    encoder.push('\n')?;
                }
                c => encoder.push(c)?,
            }
        }

        encoder.flush()
    }
}

impl Protocol for SimpleTextOutput {
    const GUID: uefi::datatypes::Guid = SimpleTextOutputProtocol::GUID;

    unsafe fn from_ffi_ptr(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr.cast::<SimpleTextOutputProtocol>()).map(SimpleTextOutput::new)
    }
}

/// The number of characters passed to the firmware per call.
const BUFFER_LENGTH: usize = 128;

/// Written in place of characters outside of UCS-2.
const REPLACEMENT: Char16 = match Char16::new('\u{FFFD}') {
    Some(c) => c,
    None => Char16::NUL,
};

/// Converts UTF-8 into NUL terminated UCS-2 chunks without allocating.
struct Encoder<'output> {
    output: &'output mut SimpleTextOutput,
    buffer: [Char16; BUFFER_LENGTH + 1],
    length: usize,
}

impl Encoder<'_> {
    fn push(&mut self, c: char) -> fmt::Result {
        if self.length == BUFFER_LENGTH {
            self.flush()?;
        }

        self.buffer[self.length] = Char16::new(c).unwrap_or(REPLACEMENT);
        self.length += 1;

        Ok(())
    }

    fn flush(&mut self) -> fmt::Result {
        if self.length == 0 {
            return Ok(());
        }

        self.buffer[self.length] = Char16::NUL;
        let string = CStr16::from_slice(&self.buffer[..=self.length]);
        self.length = 0;

        self.output.output_string(string).map_err(|_| fmt::Error)
    }
}

/// Interface for text-based input devices.
pub struct SimpleTextInput {
    /// Pointer to the interface.
    ptr: NonNull<SimpleTextInputProtocol>,
}

impl SimpleTextInput {
    /// Wraps the interface at `ptr`.
    pub(in crate::uefi) fn new(ptr: NonNull<SimpleTextInputProtocol>) -> SimpleTextInput {
        SimpleTextInput { ptr }
    }

    /// Resets the input device, discarding pending keystrokes.
    pub fn reset(&mut self) -> Result<(), Status> {
        // SAFETY:
        // All [`SimpleTextInput`] structures point to a valid [`SimpleTextInputProtocol`].
        let reset_ptr = unsafe { (*self.ptr.as_ptr()).reset };

        // SAFETY:
        // `reset_ptr` is being called with valid arguments and the correct interface.
        unsafe { reset_ptr(self.ptr.as_ptr(), false) }.into_result()
    }

    /// Reads the next keystroke, if one is pending.
    pub fn read_key(&mut self) -> Result<Option<InputKey>, Status> {
        // SAFETY:
        // All [`SimpleTextInput`] structures point to a valid [`SimpleTextInputProtocol`].
        let read_key_stroke_ptr = unsafe { (*self.ptr.as_ptr()).read_key_stroke };

        let mut key = MaybeUninit::uninit();

        // SAFETY:
        // `read_key_stroke_ptr` is being called with valid arguments and the correct interface.
        match unsafe { read_key_stroke_ptr(self.ptr.as_ptr(), key.as_mut_ptr()) } {
            Status::NOT_READY => Ok(None),
            status => status.into_result().map(|()| {
                // SAFETY:
                // The call succeeded, so `key` has been initialized.
                Some(unsafe { key.assume_init() })
            }),
        }
    }

    /// Returns the event signaled when a keystroke is pending.
    pub fn wait_for_key_event(&self) -> RawEvent {
        // SAFETY:
        // All [`SimpleTextInput`] structures point to a valid [`SimpleTextInputProtocol`].
        unsafe { (*self.ptr.as_ptr()).wait_for_key }
    }
}

impl Protocol for SimpleTextInput {
    const GUID: uefi::datatypes::Guid = SimpleTextInputProtocol::GUID;

    unsafe fn from_ffi_ptr(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr.cast::<SimpleTextInputProtocol>()).map(SimpleTextInput::new)
    }
}
