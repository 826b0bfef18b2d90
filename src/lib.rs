//! cs5536 - AMD CS5536 southbridge initialization for coreboot-style firmware
//!
//! Brings the CS5536 companion chip of a Geode LX system from reset state to
//! a working southbridge: GeodeLink bus mastering and clock gating, NAND/NOR
//! flash chip selects, LPC serial IRQ and RTC, the two legacy UARTs, PCI
//! interrupt routing through VSA, and USB port 4 host/device muxing.
//!
//! The firmware supplies register access and device lookup through the
//! [`Platform`] trait ([`board::HardwarePlatform`] on real hardware) and
//! calls [`chipset_init`] once after enumeration, then [`southbridge_init`]
//! for the ISA bridge (or [`bring_up`] for both).

#![cfg_attr(not(test), no_std)]
#![allow(unsafe_op_in_unsafe_fn)]

pub mod arch;
pub mod board;
pub mod drivers;
pub mod logger;
pub mod southbridge;

pub use southbridge::config::{ComPortConfig, SouthbridgeConfig};
pub use southbridge::{
    ChipsetError, ConfigError, Platform, bring_up, chipset_init, southbridge_init,
};

/// Default console baud rate
pub const CONSOLE_BAUD: u32 = 115_200;

/// Bring up the COM1 console and install the serial logger
///
/// Only useful once [`southbridge_init`] has routed COM1 onto its pins.
/// Returns false if no UART answered or a logger was already installed.
pub fn console_init(level: log::LevelFilter) -> bool {
    drivers::serial::init(drivers::serial::COM1, CONSOLE_BAUD) && logger::init(level)
}
