//! Logging to the UEFI console, and optionally to the first serial port.

use core::fmt::Write;

use log::{Level, Log, Metadata, Record, SetLoggerError};
use uefi::protocols::console::text::{BackgroundColor, ForegroundColor};

use crate::config;

/// Writes log records to the console output device of the system table.
struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

/// Installs the logger.
///
/// # Errors
/// Returns [`SetLoggerError`] if a logger has already been installed.
pub fn init() -> Result<(), SetLoggerError> {
    #[cfg(all(feature = "serial_logging", target_arch = "x86_64"))]
    serial::init();

    log::set_logger(&LOGGER)?;
    log::set_max_level(config::LOG_FILTER);

    Ok(())
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= config::LOG_FILTER
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        if let Some(mut stdout) = crate::uefi::system_table().and_then(|table| table.stdout()) {
            let previous = stdout
                .info()
                .and_then(|mode| usize::try_from(mode.attributes).ok());

            let _ = stdout.set_attribute(BackgroundColor::Black, color(record.level()));
            let _ = writeln!(stdout, "[{:<5}] {}", record.level(), record.args());

            if let Some(previous) = previous {
                let _ = stdout.set_raw_attribute(previous);
            }
        }

        #[cfg(all(feature = "serial_logging", target_arch = "x86_64"))]
        serial::log(record);
    }

    fn flush(&self) {}
}

/// Returns the console color records of `level` are written in.
fn color(level: Level) -> ForegroundColor {
    match level {
        Level::Error => ForegroundColor::LightRed,
        Level::Warn => ForegroundColor::Yellow,
        Level::Info => ForegroundColor::White,
        Level::Debug | Level::Trace => ForegroundColor::LightGray,
    }
}

#[cfg(all(feature = "serial_logging", target_arch = "x86_64"))]
mod serial {
    use core::fmt::Write;

    use log::Record;
    use spin::Mutex;
    use uart_16550::SerialPort;

    use crate::config;

    // SAFETY:
    // COM1 is a standard 16550 compatible port on the platforms this image targets.
    static SERIAL_PORT: Mutex<SerialPort> = Mutex::new(unsafe { SerialPort::new(config::COM1) });

    pub fn init() {
        SERIAL_PORT.lock().init();
    }

    pub fn log(record: &Record) {
        let mut port = SERIAL_PORT.lock();
        let _ = write!(port, "[{:<5}] {}\r\n", record.level(), record.args());
    }
}
