//! Board configuration for the southbridge
//!
//! These records are filled in by the board (the devicetree entry for the
//! ISA bridge) and are only ever read here.

/// Configuration of one legacy serial port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComPortConfig {
    pub enable: bool,
    /// Legacy I/O base: 0x3F8, 0x3E8, 0x2F8 or 0x2E8
    pub address: u16,
    pub irq: u8,
}

impl ComPortConfig {
    pub const DISABLED: Self = Self {
        enable: false,
        address: 0,
        irq: 0,
    };

    pub const fn enabled(address: u16, irq: u8) -> Self {
        Self {
            enable: true,
            address,
            irq,
        }
    }
}

/// Southbridge feature toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SouthbridgeConfig {
    /// Serial IRQ mask for the LPC bus; zero leaves serial IRQ off
    pub lpc_serirq_enable: u32,
    /// Serial IRQ polarity inversion mask
    pub lpc_serirq_polarity: u32,
    /// 0 = continuous, 1 = quiet mode
    pub lpc_serirq_mode: u32,
    pub com1: ComPortConfig,
    pub com2: ComPortConfig,
    /// PCI INTA-D routing: INTA/B in the low half, INTC/D in the high half
    pub enable_gpio_int_route: u32,
    /// Flash on the chip selects instead of an IDE drive
    pub enable_ide_nand_flash: bool,
    /// USB port 4 as device (UDC) instead of host
    pub enable_usbp4_device: bool,
    /// Overcurrent configuration OR-ed into the OTG capability register
    pub enable_usbp4_overcurrent: u32,
}

impl SouthbridgeConfig {
    /// Nothing enabled; both UARTs released
    pub const fn new() -> Self {
        Self {
            lpc_serirq_enable: 0,
            lpc_serirq_polarity: 0,
            lpc_serirq_mode: 0,
            com1: ComPortConfig::DISABLED,
            com2: ComPortConfig::DISABLED,
            enable_gpio_int_route: 0,
            enable_ide_nand_flash: false,
            enable_usbp4_device: false,
            enable_usbp4_overcurrent: 0,
        }
    }
}

/// What sits behind a flash chip select
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashType {
    None,
    Nor,
    Nand,
}

/// How a flash chip select is decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashInterface {
    Io,
    Memory,
}

/// LBAR masks for the supported window sizes
pub mod flash_mask {
    pub const IO_16B: u32 = 0x0000_FFF0;
    pub const IO_32B: u32 = 0x0000_FFE0;
    pub const IO_64B: u32 = 0x0000_FFC0;
    pub const IO_128B: u32 = 0x0000_FF80;
    pub const IO_256B: u32 = 0x0000_FF00;
    pub const MEM_4K: u32 = 0xFFFF_F000;
    pub const MEM_8K: u32 = 0xFFFF_E000;
    pub const MEM_16K: u32 = 0xFFFF_C000;
    pub const MEM_128K: u32 = 0xFFFE_0000;
    pub const MEM_512K: u32 = 0xFFF8_0000;
    pub const MEM_4M: u32 = 0xFFC0_0000;
    pub const MEM_8M: u32 = 0xFF80_0000;
    pub const MEM_16M: u32 = 0xFF00_0000;
}

/// One flash chip-select slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashDevice {
    pub flash_type: FlashType,
    pub interface: FlashInterface,
    pub mask: u32,
}

impl FlashDevice {
    pub const NONE: Self = Self {
        flash_type: FlashType::None,
        interface: FlashInterface::Io,
        mask: 0,
    };

    pub const fn is_present(&self) -> bool {
        !matches!(self.flash_type, FlashType::None)
    }
}

/// Chip selects CS0-CS3
pub static FLASH_INIT_TABLE: [FlashDevice; 4] = [
    FlashDevice {
        flash_type: FlashType::Nand,
        interface: FlashInterface::Memory,
        mask: flash_mask::MEM_4K,
    },
    FlashDevice::NONE,
    FlashDevice::NONE,
    FlashDevice::NONE,
];
