//! AMD CS5536 Southbridge Initialization
//!
//! Bring-up is split in two passes, matching the coreboot device phases:
//!
//! ```text
//! chipset_init()                       southbridge_init(isa)
//!   |                                    |
//!   +-- POST code                        +-- interrupt controller
//!   +-- HD IRQ GPIO, ATA/IDE MSRs        +-- LPC: SERIRQ, DMA, RTC
//!   +-- bus master table                 +-- COM1 / COM2
//!   +-- flash chip selects (optional)    +-- PCI INTx routing
//!   +-- clock gating table               +-- flash header swap (optional)
//!                                        +-- USB port 4
//! ```
//!
//! Clock gating must be the last step of the first pass. The flash LBARs
//! must be sized before VSA is asked to expose the flash header in the
//! second pass.
//!
//! # Errors
//!
//! A bad board setting or a missing device only skips the feature it
//! belongs to. A failing register space aborts the pass; nothing is rolled
//! back.

pub mod config;
pub mod flash;
pub mod lpc;
pub mod regs;
pub mod tables;
#[cfg(test)]
pub(crate) mod testing;
pub mod uart;
pub mod usb;

use self::config::{FLASH_INIT_TABLE, FlashDevice, SouthbridgeConfig};
use self::regs::*;
use self::tables::{CLOCK_GATING_TABLE, SB_MASTER_CONF_TABLE, apply_table};
use crate::drivers::RegisterAccessError;
use crate::drivers::mmio::MemorySpace;
use crate::drivers::msr::MsrSpace;
use crate::drivers::pci::access::ConfigSpace;
use crate::drivers::pci::{DeviceHandle, DeviceId, DeviceLocator};
use crate::drivers::port::IoSpace;

/// A board setting outside the legal set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// COM base address with no LEG_IO encoding
    InvalidComAddress(u16),
    /// IRQ that does not fit the 4-bit mapper field
    InvalidComIrq(u8),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidComAddress(addr) => write!(f, "unsupported COM address {:#x}", addr),
            Self::InvalidComIrq(irq) => write!(f, "unsupported COM IRQ {}", irq),
        }
    }
}

/// Chipset initialization error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipsetError {
    /// Board configuration rejected; the feature was left as it was
    Configuration(ConfigError),
    /// A device the feature needs is not present
    DeviceNotFound(DeviceId),
    /// The register transaction layer failed
    RegisterAccess(RegisterAccessError),
}

impl From<RegisterAccessError> for ChipsetError {
    fn from(err: RegisterAccessError) -> Self {
        Self::RegisterAccess(err)
    }
}

impl From<ConfigError> for ChipsetError {
    fn from(err: ConfigError) -> Self {
        Self::Configuration(err)
    }
}

impl core::fmt::Display for ChipsetError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Configuration(err) => write!(f, "configuration error: {}", err),
            Self::DeviceNotFound(id) => write!(f, "device {} not found", id),
            Self::RegisterAccess(err) => write!(f, "register access failed: {}", err),
        }
    }
}

/// Result type for chipset initialization
pub type Result<T> = core::result::Result<T, ChipsetError>;

/// Log a feature's failure and decide whether the pass continues
///
/// Only register access failures are passed on; `feature` should name the
/// block, and the device or register it was touching.
pub(crate) fn recover<T, E>(
    feature: impl core::fmt::Display,
    result: core::result::Result<T, E>,
) -> Result<()>
where
    E: Into<ChipsetError>,
{
    match result.map_err(Into::into) {
        Ok(_) => Ok(()),
        Err(err @ ChipsetError::RegisterAccess(_)) => {
            log::error!("cs5536: {}: {}", feature, err);
            Err(err)
        }
        Err(err @ ChipsetError::Configuration(_)) => {
            log::error!("cs5536: {}: {}, left unchanged", feature, err);
            Ok(())
        }
        Err(err @ ChipsetError::DeviceNotFound(_)) => {
            log::warn!("cs5536: {}: {}, skipped", feature, err);
            Ok(())
        }
    }
}

/// Everything the southbridge code needs from the surrounding firmware
pub trait Platform: MsrSpace + ConfigSpace + IoSpace + MemorySpace + DeviceLocator {
    /// Board configuration attached to a device, if any
    fn device_config(&self, dev: DeviceHandle) -> Option<SouthbridgeConfig>;

    /// Report boot progress
    fn post_code(&mut self, code: u8);

    /// Program the legacy 8259 pair
    fn setup_interrupt_controller(&mut self);

    fn rtc_init(&mut self);

    fn isa_dma_init(&mut self);
}

/// First pass: MSR-level setup of the southbridge
///
/// Must run once, after the ISA bridge has been enumerated and before the
/// serial console, USB or storage are used. A missing ISA bridge is logged
/// and leaves the chipset untouched.
pub fn chipset_init<P: Platform + ?Sized>(hw: &mut P) -> Result<()> {
    chipset_init_with_flash(hw, &FLASH_INIT_TABLE)
}

/// [`chipset_init`] with a board-specific chip-select table
pub fn chipset_init_with_flash<P: Platform + ?Sized>(
    hw: &mut P,
    flash_table: &[FlashDevice; 4],
) -> Result<()> {
    hw.post_code(POST_CHIPSET_INIT);

    let Some(dev) = hw.find_device(CS5536_ISA, 0) else {
        log::error!("chipset_init: Could not find the south bridge!");
        return Ok(());
    };
    let Some(sb) = hw.device_config(dev) else {
        log::error!("chipset_init: no configuration for south bridge at {}", dev);
        return Ok(());
    };

    // HD IRQ
    let hd_irq = hw
        .outl(GPIO_IO_BASE + GPIOL_INPUT_ENABLE, gpiol_set(2))
        .and_then(|()| hw.outl(GPIO_IO_BASE + GPIOL_IN_AUX1_SELECT, gpiol_set(2)));
    recover(format_args!("HD IRQ, GPIO base {:#x}", GPIO_IO_BASE), hd_irq)?;

    // Allow I/O reads and writes during an ATA DMA operation
    let ata = hw.modify_msr(ATA_SB_GLD_MSR_ERR, |mut msr| {
        msr.lo &= !ATA_ERR_DMA_IO_BLOCK;
        msr
    });
    recover(format_args!("ATA, MSR {:#010X}", ATA_SB_GLD_MSR_ERR), ata)?;

    // Enable post primary IDE
    let ppide = hw.modify_msr(GLPCI_SB_CTRL, |mut msr| {
        msr.lo |= GLPCI_CTRL_PPIDE_SET;
        msr
    });
    recover(format_args!("IDE, MSR {:#010X}", GLPCI_SB_CTRL), ppide)?;

    recover("bus master table", apply_table(hw, SB_MASTER_CONF_TABLE))?;

    log::info!(
        "{}Doing chipset_flash_setup()",
        if sb.enable_ide_nand_flash { "" } else { "Not " }
    );
    if sb.enable_ide_nand_flash {
        let flash = flash::chipset_flash_setup(hw, flash_table);
        recover("flash chip selects", flash)?;
    }

    recover("clock gating table", apply_table(hw, CLOCK_GATING_TABLE))?;
    Ok(())
}

/// Second pass: per-feature setup of one southbridge device
pub fn southbridge_init<P: Platform + ?Sized>(hw: &mut P, dev: DeviceHandle) -> Result<()> {
    log::info!("cs5536: southbridge_init at {}", dev);
    let Some(sb) = hw.device_config(dev) else {
        log::error!("cs5536: no configuration for {}, skipping", dev);
        return Ok(());
    };

    hw.setup_interrupt_controller();
    let lpc = lpc::lpc_init(hw, &sb);
    recover(format_args!("LPC on {}", dev), lpc)?;
    let uarts = uart::uarts_init(hw, &sb);
    recover(format_args!("UARTs on {}", dev), uarts)?;
    let route = lpc::gpio_int_route(hw, sb.enable_gpio_int_route);
    recover(format_args!("PCI INT routing, VSA port {:#x}", VRC_INDEX), route)?;

    log::info!(
        "cs5536: southbridge_init: enable_ide_nand_flash is {}",
        sb.enable_ide_nand_flash
    );
    if sb.enable_ide_nand_flash {
        let header = flash::enable_ide_nand_flash_header(hw);
        recover(format_args!("flash header at {}", IDE_HEADER), header)?;
    }

    let usb = usb::enable_usb_port4(hw, &sb);
    recover("USB port 4 (EHCI/OTG/UDC)", usb)?;
    Ok(())
}

/// Run both passes: [`chipset_init`], then [`southbridge_init`] for every
/// ISA bridge instance found
pub fn bring_up<P: Platform + ?Sized>(hw: &mut P) -> Result<()> {
    chipset_init(hw)?;

    let mut instance = 0;
    while let Some(dev) = hw.find_device(CS5536_ISA, instance) {
        southbridge_init(hw, dev)?;
        instance += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::msr::Msr;
    use crate::southbridge::config::ComPortConfig;
    use crate::southbridge::testing::*;

    fn scenario() -> SouthbridgeConfig {
        let mut sb = SouthbridgeConfig::new();
        sb.enable_ide_nand_flash = true;
        sb.com1 = ComPortConfig::enabled(0x3F8, 4);
        sb
    }

    fn isa() -> DeviceHandle {
        DeviceHandle::new(ISA_ADDR)
    }

    #[test]
    fn end_to_end_flash_com1_usb_host() {
        let sb = scenario();
        let mut board = FakeBoard::cs5536(sb);

        chipset_init(&mut board).unwrap();
        southbridge_init(&mut board, isa()).unwrap();

        assert_eq!(board.msr(MDD_LBAR_FLSH[0]).hi, 0xFFFF_F006);
        assert_eq!(board.msr(MDD_NORF_CNTRL).lo & 1, 1);
        assert_eq!(board.config(IDE_HEADER, 0x40), 0xDEAD_BEEF);
        assert_eq!((board.msr(MDD_LEG_IO).lo >> 16) & 0xF, 7);
        assert_eq!((board.msr(MDD_IRQM_YHIGH).lo >> 24) & 0xF, 4);
        assert_eq!(board.msr(MDD_UART1_CONF).lo, 0x12);
        assert_eq!(board.mem(OTG_BAR + regs::UOCMUX), PMUX_HOST);
        assert_eq!(board.msr(USB2_SB_GLD_MSR_CONF).hi & USB2_UPPER_SSDEN_SET, USB2_UPPER_SSDEN_SET);
    }

    #[test]
    fn chipset_init_order() {
        let sb = scenario();
        let mut board = FakeBoard::cs5536(sb);
        chipset_init(&mut board).unwrap();

        let writes = board.writes();
        assert_eq!(writes[0], Access::PostCode(POST_CHIPSET_INIT));

        let position = |index: u32| {
            writes
                .iter()
                .position(|a| matches!(a, Access::Msr(i, _) if *i == index))
                .unwrap()
        };
        let master = position(USB2_SB_GLD_MSR_CONF);
        let flash = position(MDD_LBAR_FLSH[0]);
        let gating = position(GLIU_SB_GLD_MSR_PM);
        assert!(position(GLPCI_SB_CTRL) < master);
        assert!(master < flash);
        assert!(flash < gating);
        assert_eq!(
            writes.last(),
            Some(&Access::Msr(AC97_SB_GLD_MSR_PM, Msr::lo(5)))
        );
    }

    #[test]
    fn ide_mode_leaves_flash_slots_alone() {
        let sb = SouthbridgeConfig::new();
        let mut board = FakeBoard::cs5536(sb);

        chipset_init(&mut board).unwrap();
        southbridge_init(&mut board, isa()).unwrap();

        for port in MDD_LBAR_FLSH {
            assert!(!board.msr_written(port));
        }
        assert!(!board.msr_written(MDD_NORF_CNTRL));
        assert_eq!(board.count(&Access::Config(IDE_HEADER, 0x40, 0xDEAD_BEEF)), 0);
    }

    #[test]
    fn ata_and_ide_control_bits() {
        let mut board = FakeBoard::cs5536(SouthbridgeConfig::new());
        board.set_msr(ATA_SB_GLD_MSR_ERR, Msr::new(0x1, 0x0000_0F00));
        chipset_init(&mut board).unwrap();

        assert_eq!(board.msr(ATA_SB_GLD_MSR_ERR), Msr::new(0x1, 0x0000_0E00));
        assert_eq!(board.msr(GLPCI_SB_CTRL).lo & (1 << 17), 1 << 17);
        assert_eq!(board.io(0x6120), 1 << 2);
        assert_eq!(board.io(0x6134), 1 << 2);
    }

    #[test]
    fn missing_southbridge_only_posts() {
        let mut board = FakeBoard::new();
        chipset_init(&mut board).unwrap();
        assert_eq!(board.writes(), vec![Access::PostCode(POST_CHIPSET_INIT)]);
    }

    #[test]
    fn missing_configuration_is_not_fatal() {
        let mut board = FakeBoard::cs5536(scenario());
        board.clear_config();
        chipset_init(&mut board).unwrap();
        southbridge_init(&mut board, isa()).unwrap();
        assert_eq!(board.writes(), vec![Access::PostCode(POST_CHIPSET_INIT)]);
    }

    #[test]
    fn southbridge_init_sequence() {
        let mut sb = scenario();
        sb.enable_gpio_int_route = 0x0A0A_0B0B;
        let mut board = FakeBoard::cs5536(sb);
        southbridge_init(&mut board, isa()).unwrap();

        let writes = board.writes();
        let at = |access: &Access| writes.iter().position(|a| a == access).unwrap();
        let pic = at(&Access::Hook("setup_interrupt_controller"));
        let rtc = at(&Access::Hook("rtc_init"));
        let com1 = at(&Access::Msr(MDD_UART1_CONF, Msr::lo(0x12)));
        let route = at(&Access::Io32(VRC_INDEX, 0xFC53_0002));
        let header = at(&Access::Config(IDE_HEADER, 0x40, 0xDEAD_BEEF));
        let vpci = at(&Access::Config(OTG_ADDR, 0x7C, 0xDEAD_BEEF));
        assert_eq!(pic, 0);
        assert!(rtc < com1 && com1 < route && route < header && header < vpci);
    }

    #[test]
    fn bad_com_address_degrades_but_completes() {
        let mut sb = scenario();
        sb.com1 = ComPortConfig::enabled(0x3F0, 4);
        let mut board = FakeBoard::cs5536(sb);

        assert!(southbridge_init(&mut board, isa()).is_ok());
        assert!(!board.msr_written(MDD_UART1_CONF));
        // Later, independent blocks still ran
        assert_eq!(board.count(&Access::Config(IDE_HEADER, 0x40, 0xDEAD_BEEF)), 1);
        assert_eq!(board.count(&Access::Config(UDC_ADDR, 0x7C, 0xDEAD_BEEF)), 1);
    }

    #[test]
    fn unavailable_msr_space_aborts() {
        capture_logs();
        let mut board = FakeBoard::cs5536(scenario());
        board.fail_msr();
        assert_eq!(
            chipset_init(&mut board),
            Err(ChipsetError::RegisterAccess(RegisterAccessError::Unavailable))
        );
        // HD IRQ GPIO writes landed before the first MSR access; nothing after
        assert_eq!(board.writes().len(), 3);
        assert!(logged(
            "cs5536: ATA, MSR 0x51300003: register access failed: register space unavailable"
        ));
    }

    #[test]
    fn fatal_usb_failure_names_the_feature() {
        capture_logs();
        let mut board = FakeBoard::cs5536(scenario());
        board.fail_mem();

        assert_eq!(
            southbridge_init(&mut board, isa()),
            Err(ChipsetError::RegisterAccess(RegisterAccessError::Unavailable))
        );
        assert!(logged(
            "cs5536: USB port 4 (EHCI/OTG/UDC): register access failed: register space unavailable"
        ));
        // Nothing after the failing block ran
        assert_eq!(board.count(&Access::Config(OTG_ADDR, 0x7C, 0xDEAD_BEEF)), 0);
    }

    #[test]
    fn running_twice_matches_running_once() {
        let mut sb = scenario();
        sb.com2 = ComPortConfig::enabled(0x2F8, 3);
        sb.enable_usbp4_device = true;
        sb.enable_usbp4_overcurrent = 0x40;
        sb.lpc_serirq_enable = 0x12F8;
        sb.lpc_serirq_polarity = 0xEFFD;
        sb.enable_gpio_int_route = 0x0A0A_0B0B;

        let mut once = FakeBoard::cs5536(sb);
        bring_up(&mut once).unwrap();

        let mut twice = FakeBoard::cs5536(sb);
        bring_up(&mut twice).unwrap();
        bring_up(&mut twice).unwrap();

        assert_eq!(once.state(), twice.state());
    }

    #[test]
    fn bring_up_visits_every_isa_instance() {
        let sb = SouthbridgeConfig::new();
        let mut board = FakeBoard::cs5536(sb);
        board.add_device(CS5536_ISA, crate::drivers::pci::PciAddress::new(1, 0, 0));
        bring_up(&mut board).unwrap();
        assert_eq!(board.count(&Access::Hook("setup_interrupt_controller")), 2);
    }

    #[test]
    fn errors_describe_themselves() {
        let err = ChipsetError::DeviceNotFound(CS5536_OTG);
        assert_eq!(format!("{}", err), "device 1022:2097 not found");
        let err: ChipsetError = ConfigError::InvalidComAddress(0x3F0).into();
        assert_eq!(
            format!("{}", err),
            "configuration error: unsupported COM address 0x3f0"
        );
    }
}
