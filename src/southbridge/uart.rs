//! Legacy UART (COM1/COM2) routing
//!
//! An enabled port gets its legacy address and IRQ in the shared MDD
//! registers, its TX/RX GPIOs switched to the UART function, and finally its
//! device enable. A disabled port is explicitly reset and released, since a
//! Super I/O may drive the same pins.

use tock_registers::LocalRegisterCopy;
use tock_registers::fields::Field;

use super::config::{ComPortConfig, SouthbridgeConfig};
use super::regs::*;
use super::{ChipsetError, ConfigError, recover};
use crate::drivers::msr::{Msr, MsrSpace};
use crate::drivers::pci::DeviceLocator;
use crate::drivers::pci::access::ConfigSpace;
use crate::drivers::port::IoSpace;

/// One of the two CS5536 UARTs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComPort {
    Com1,
    Com2,
}

/// Per-port register locations
struct PortRegs {
    conf: u32,
    addr: Field<u32, LEG_IO::Register>,
    irq: Field<u32, IRQM_YHIGH::Register>,
    tx_gpio: u32,
    rx_gpio: u32,
}

impl ComPort {
    fn regs(self) -> PortRegs {
        match self {
            Self::Com1 => PortRegs {
                conf: MDD_UART1_CONF,
                addr: LEG_IO::UART1_ADDR,
                irq: IRQM_YHIGH::UART1_IRQ,
                tx_gpio: 8,
                rx_gpio: 9,
            },
            Self::Com2 => PortRegs {
                conf: MDD_UART2_CONF,
                addr: LEG_IO::UART2_ADDR,
                irq: IRQM_YHIGH::UART2_IRQ,
                tx_gpio: 3,
                rx_gpio: 4,
            },
        }
    }
}

impl core::fmt::Display for ComPort {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Com1 => write!(f, "COM1"),
            Self::Com2 => write!(f, "COM2"),
        }
    }
}

/// LEG_IO address select code for a legacy COM base address
pub fn address_select(address: u16) -> Result<u32, ConfigError> {
    match address {
        0x3F8 => Ok(7),
        0x3E8 => Ok(6),
        0x2F8 => Ok(5),
        0x2E8 => Ok(4),
        _ => Err(ConfigError::InvalidComAddress(address)),
    }
}

/// A GPIO base that is assigned and leaves room for every GPIOL register
fn usable_gpio_base(base: u16) -> bool {
    base != 0 && base.checked_add(GPIOL_IN_AUX1_SELECT).is_some()
}

/// Rewrite one field of an MSR's low dword
fn modify_field<M, R>(
    msr: &mut M,
    index: u32,
    field: Field<u32, R>,
    value: u32,
) -> crate::drivers::Result<()>
where
    M: MsrSpace + ?Sized,
    R: tock_registers::RegisterLongName,
{
    let mut current = msr.rdmsr(index)?;
    let mut lo = LocalRegisterCopy::<u32, R>::new(current.lo);
    lo.modify(field.val(value));
    current.lo = lo.get();
    msr.wrmsr(index, current)
}

/// Route and enable one UART
///
/// The configuration is validated before anything is written, so a bad
/// address or IRQ leaves the port untouched. `gpio_base` is the GPIO I/O
/// base from the ISA bridge; an absent or unusable base skips the port with
/// `DeviceNotFound`.
pub fn enable_com_port<H>(
    hw: &mut H,
    port: ComPort,
    cfg: &ComPortConfig,
    gpio_base: Option<u16>,
) -> Result<(), ChipsetError>
where
    H: MsrSpace + IoSpace + ?Sized,
{
    let select = address_select(cfg.address)?;
    if cfg.irq > 15 {
        return Err(ConfigError::InvalidComIrq(cfg.irq).into());
    }
    let gpio = gpio_base
        .filter(|&base| usable_gpio_base(base))
        .ok_or(ChipsetError::DeviceNotFound(CS5536_ISA))?;
    let regs = port.regs();

    modify_field(hw, MDD_LEG_IO, regs.addr, select)?;
    modify_field(hw, MDD_IRQM_YHIGH, regs.irq, cfg.irq as u32)?;

    let tx = gpiol_set(regs.tx_gpio);
    let rx = gpiol_set(regs.rx_gpio);
    hw.outl(gpio + GPIOL_OUTPUT_ENABLE, tx)?;
    hw.outl(gpio + GPIOL_OUT_AUX1_SELECT, tx)?;
    hw.outl(gpio + GPIOL_INPUT_ENABLE, rx)?;
    hw.outl(gpio + GPIOL_IN_AUX1_SELECT, rx)?;
    hw.outl(gpio + GPIOL_PULLUP_ENABLE, tx | rx)?;

    let mut conf = LocalRegisterCopy::<u32, UART_CONF::Register>::new(0);
    conf.modify(UART_CONF::DEVEN::SET + UART_CONF::EN_BANKS::SET);
    hw.wrmsr(regs.conf, Msr::lo(conf.get()))?;

    log::info!(
        "cs5536: {} enabled at {:#x}, IRQ {}",
        port,
        cfg.address,
        cfg.irq
    );
    Ok(())
}

/// Reset a UART and release its address and IRQ
pub fn disable_com_port<M: MsrSpace + ?Sized>(
    msr: &mut M,
    port: ComPort,
) -> crate::drivers::Result<()> {
    let regs = port.regs();

    let mut conf = msr.rdmsr(regs.conf)?;
    conf.lo = UART_CONF::SOFT_RESET::SET.value;
    msr.wrmsr(regs.conf, conf)?;
    conf.lo = 0;
    msr.wrmsr(regs.conf, conf)?;

    modify_field(msr, MDD_IRQM_YHIGH, regs.irq, 0)?;
    modify_field(msr, MDD_LEG_IO, regs.addr, 0)?;

    log::debug!("cs5536: {} disabled", port);
    Ok(())
}

/// Enable or release COM1 and COM2 per the board configuration
///
/// A configuration error or a missing ISA bridge only affects the port in
/// question; the other port is still handled.
pub fn uarts_init<H>(hw: &mut H, sb: &SouthbridgeConfig) -> super::Result<()>
where
    H: MsrSpace + IoSpace + ConfigSpace + DeviceLocator + ?Sized,
{
    let gpio_base = match hw.find_device(CS5536_ISA, 0) {
        Some(isa) => {
            let bar = hw.config_read32(isa, PCI_BASE_ADDRESS_1)? & !1;
            log::debug!("GPIO_ADDR: {:08X}", bar);
            match u16::try_from(bar) {
                Ok(base) if usable_gpio_base(base) => Some(base),
                _ => {
                    log::warn!(
                        "cs5536: GPIO BAR {:#010x} on {} is not a usable I/O base",
                        bar,
                        isa
                    );
                    None
                }
            }
        }
        None => None,
    };

    for (port, cfg) in [(ComPort::Com1, &sb.com1), (ComPort::Com2, &sb.com2)] {
        let result = if cfg.enable {
            enable_com_port(hw, port, cfg, gpio_base)
        } else {
            disable_com_port(hw, port).map_err(ChipsetError::from)
        };
        recover(port, result)?;
    }
    Ok(())
}
