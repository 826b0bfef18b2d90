//! CS5536 Register Definitions
//!
//! MSR indices, I/O ports and MMIO offsets used during chipset bring-up.
//! MSRs are grouped by GeodeLink device; each device's generic GLD MSRs sit
//! at the same offsets from its base.

use tock_registers::register_bitfields;

use crate::drivers::pci::{DeviceId, PciAddress};

// ============================================================================
// PCI identities
// ============================================================================

/// AMD PCI Vendor ID
pub const AMD_VID: u16 = 0x1022;

pub const CS5536_ISA: DeviceId = DeviceId::new(AMD_VID, 0x2090);
pub const CS5536_EHCI: DeviceId = DeviceId::new(AMD_VID, 0x2095);
pub const CS5536_UDC: DeviceId = DeviceId::new(AMD_VID, 0x2096);
pub const CS5536_OTG: DeviceId = DeviceId::new(AMD_VID, 0x2097);

pub const PCI_BASE_ADDRESS_0: u8 = 0x10;
pub const PCI_BASE_ADDRESS_1: u8 = 0x14;

/// IDE function header; VSA watches writes to it
pub const IDE_HEADER: PciAddress = PciAddress::new(0, 0x0f, 2);
/// Register in the IDE header that selects the flash header instead
pub const IDE_FLASH_SWITCH: u8 = 0x40;
/// Offset in a virtual header that hides the header once written
pub const VPCI_DISABLE: u8 = 0x7C;
/// Value VSA expects in both handoff registers
pub const VSA_MAGIC: u32 = 0xDEAD_BEEF;

// ============================================================================
// GeodeLink device MSR bases
// ============================================================================

pub const MSR_SB_GLPCI: u32 = 0x5100_0000;
pub const MSR_SB_GLIU: u32 = 0x5101_0000;
pub const MSR_SB_USB2: u32 = 0x5120_0000;
pub const MSR_SB_ATA: u32 = 0x5130_0000;
pub const MSR_SB_MDD: u32 = 0x5140_0000;
pub const MSR_SB_AC97: u32 = 0x5150_0000;
pub const MSR_SB_GLCP: u32 = 0x5170_0000;

/// Generic GLD MSR offsets
const GLD_MSR_CONF: u32 = 0x01;
const GLD_MSR_ERR: u32 = 0x03;
const GLD_MSR_PM: u32 = 0x04;
const GLD_MSR_DIAG: u32 = 0x05;

pub const GLIU_SB_GLD_MSR_PM: u32 = MSR_SB_GLIU + GLD_MSR_PM;
pub const GLPCI_SB_GLD_MSR_PM: u32 = MSR_SB_GLPCI + GLD_MSR_PM;
pub const GLPCI_SB_CTRL: u32 = MSR_SB_GLPCI + 0x10;
pub const USB2_SB_GLD_MSR_CONF: u32 = MSR_SB_USB2 + GLD_MSR_CONF;
pub const USB2_SB_GLD_MSR_DIAG: u32 = MSR_SB_USB2 + GLD_MSR_DIAG;
pub const ATA_SB_GLD_MSR_CONF: u32 = MSR_SB_ATA + GLD_MSR_CONF;
pub const ATA_SB_GLD_MSR_ERR: u32 = MSR_SB_ATA + GLD_MSR_ERR;
pub const ATA_SB_GLD_MSR_PM: u32 = MSR_SB_ATA + GLD_MSR_PM;
pub const MDD_SB_GLD_MSR_CONF: u32 = MSR_SB_MDD + GLD_MSR_CONF;
pub const MDD_SB_GLD_MSR_PM: u32 = MSR_SB_MDD + GLD_MSR_PM;
pub const AC97_SB_GLD_MSR_CONF: u32 = MSR_SB_AC97 + GLD_MSR_CONF;
pub const AC97_SB_GLD_MSR_PM: u32 = MSR_SB_AC97 + GLD_MSR_PM;
pub const GLCP_SB_GLD_MSR_PM: u32 = MSR_SB_GLCP + GLD_MSR_PM;

/// Post primary IDE enable (GLPCI_SB_CTRL)
pub const GLPCI_CTRL_PPIDE_SET: u32 = 1 << 17;
/// Allow I/O during ATA DMA when clear (ATA_SB_GLD_MSR_ERR)
pub const ATA_ERR_DMA_IO_BLOCK: u32 = 1 << 8;
/// Serial short detect enable, bit 35 (USB2_SB_GLD_MSR_CONF hi)
pub const USB2_UPPER_SSDEN_SET: u32 = 1 << 3;

// ============================================================================
// Diverse Integration Logic (MDD) MSRs
// ============================================================================

/// Flash chip-select LBARs, one per slot
pub const MDD_LBAR_FLSH: [u32; 4] = [
    MSR_SB_MDD + 0x10,
    MSR_SB_MDD + 0x11,
    MSR_SB_MDD + 0x12,
    MSR_SB_MDD + 0x13,
];
pub const MDD_LEG_IO: u32 = MSR_SB_MDD + 0x14;
pub const MDD_NORF_CNTRL: u32 = MSR_SB_MDD + 0x18;
pub const MDD_DMA_MAP: u32 = MSR_SB_MDD + 0x1E;
pub const MDD_IRQM_YHIGH: u32 = MSR_SB_MDD + 0x21;
pub const MDD_IRQM_LPC: u32 = MSR_SB_MDD + 0x25;
pub const MDD_UART1_CONF: u32 = MSR_SB_MDD + 0x3A;
pub const MDD_UART2_CONF: u32 = MSR_SB_MDD + 0x3E;
pub const MDD_LPC_SIRQ: u32 = MSR_SB_MDD + 0x4E;
pub const MDD_RTC_DOMA_IND: u32 = MSR_SB_MDD + 0x55;
pub const MDD_RTC_MONA_IND: u32 = MSR_SB_MDD + 0x56;
pub const MDD_RTC_CENTURY_OFFSET: u32 = MSR_SB_MDD + 0x57;

/// LBAR high dword: NAND instead of NOR
pub const FLASH_LBAR_NAND: u32 = 1 << 1;
/// LBAR high dword: memory mapped instead of I/O mapped
pub const FLASH_LBAR_MEM: u32 = 1 << 2;

register_bitfields! [
    u32,
    /// MDD_LEG_IO low dword
    pub LEG_IO [
        /// COM1 address select
        UART1_ADDR OFFSET(16) NUMBITS(4) [],
        /// COM2 address select
        UART2_ADDR OFFSET(20) NUMBITS(4) []
    ],

    /// MDD_IRQM_YHIGH low dword: IRQ mapper, unrestricted sources Y8-Y15
    pub IRQM_YHIGH [
        UART1_IRQ OFFSET(24) NUMBITS(4) [],
        UART2_IRQ OFFSET(28) NUMBITS(4) []
    ],

    /// MDD_UARTx_CONF low dword
    pub UART_CONF [
        SOFT_RESET OFFSET(0) NUMBITS(1) [],
        DEVEN OFFSET(1) NUMBITS(1) [],
        /// Allow access to the upper register banks
        EN_BANKS OFFSET(4) NUMBITS(1) []
    ],

    /// MDD_LPC_SIRQ low dword
    pub LPC_SIRQ [
        MODE OFFSET(6) NUMBITS(1) [],
        ENABLE OFFSET(7) NUMBITS(1) [],
        INVERT OFFSET(16) NUMBITS(16) []
    ]
];

/// Route the ISA DMA channels to the LPC bus
pub const DMA_MAP_LPC: u32 = 0x7777;

/// CMOS index of the century byte
pub const RTC_CENTURY: u32 = 0x32;
/// CMOS index of the day-of-month alarm
pub const RTC_DOMA: u32 = 0x3D;
/// CMOS index of the month alarm
pub const RTC_MONA: u32 = 0x3E;

// ============================================================================
// GPIO (I/O space)
// ============================================================================

/// Fixed GPIO base used before the ISA bridge BARs are read
pub const GPIO_IO_BASE: u16 = 0x6100;

pub const GPIOL_OUTPUT_ENABLE: u16 = 0x04;
pub const GPIOL_OUT_AUX1_SELECT: u16 = 0x10;
pub const GPIOL_PULLUP_ENABLE: u16 = 0x18;
pub const GPIOL_INPUT_ENABLE: u16 = 0x20;
pub const GPIOL_IN_AUX1_SELECT: u16 = 0x34;

/// Atomic set value for a low-bank GPIO
pub const fn gpiol_set(gpio: u32) -> u32 {
    1 << gpio
}

// ============================================================================
// VSA virtual registers (I/O space)
// ============================================================================

pub const VRC_INDEX: u16 = 0xAC1C;
pub const VRC_DATA: u16 = 0xAC1E;
pub const VR_UNLOCK: u32 = 0xFC53;
pub const VRC_MISCELLANEOUS: u16 = 0x00;
pub const PCI_INT_AB: u16 = 0x02;
pub const PCI_INT_CD: u16 = 0x03;

// ============================================================================
// USB controller MMIO
// ============================================================================

pub const EHCI_BAR_SIZE: u64 = 0x1000;
pub const OTG_BAR_SIZE: u64 = 0x1000;
pub const UDC_BAR_SIZE: u64 = 0x2000;

/// EHCI capability parameters
pub const EHCI_HCCPARAMS: u64 = 0x08;
/// EHCI IP register 04, holds the HCCPARAMS write enable
pub const EHCI_IPREG04: u64 = 0xA0;
pub const USB_HCCPW_SET: u32 = 1 << 1;
/// EECP=50h, IST=01h, ASPC=1
pub const EHCI_HCCPARAMS_VALUE: u32 = 0x0000_5012;

/// OTG capability register
pub const UOCCAP: u64 = 0x00;
/// Always powered up
pub const APU_SET: u32 = 1 << 15;
/// OTG port mux register
pub const UOCMUX: u64 = 0x04;
pub const PMUX_HOST: u32 = 0x02;
pub const PMUX_DEVICE: u32 = 0x03;
/// Pull-up enable, the only UOCMUX bit carried over when the mux is set
pub const PUEN_SET: u32 = 1 << 2;
/// OTG control register
pub const UOCCTL: u64 = 0x0C;
pub const PADEN_SET: u32 = 1 << 7;

/// UDC device control register
pub const UDCDEVCTL: u64 = 0x404;
/// Soft disconnect
pub const UDC_SD_SET: u32 = 1 << 10;

// ============================================================================
// Misc
// ============================================================================

/// POST code emitted on entry to chipset init
pub const POST_CHIPSET_INIT: u8 = 0x61;
