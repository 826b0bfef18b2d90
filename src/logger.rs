//! Logging infrastructure
//!
//! This module provides logging via the `log` crate, outputting to the serial
//! console once it has been brought up.

use log::{Level, LevelFilter, Metadata, Record};

/// Serial logger implementation
struct SerialLogger;

impl log::Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let level_str = match record.level() {
                Level::Error => "ERROR",
                Level::Warn => "WARN ",
                Level::Info => "INFO ",
                Level::Debug => "DEBUG",
                Level::Trace => "TRACE",
            };

            // Format: [LEVEL] target: message
            crate::drivers::serial::write_fmt(format_args!(
                "[{}] {}: {}\n",
                level_str,
                record.target(),
                record.args()
            ));
        }
    }

    fn flush(&self) {}
}

static LOGGER: SerialLogger = SerialLogger;

/// Initialize the logging subsystem
///
/// Returns false if another logger was installed first.
pub fn init(level: LevelFilter) -> bool {
    log::set_logger(&LOGGER)
        .map(|()| log::set_max_level(level))
        .is_ok()
}
