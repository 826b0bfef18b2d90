//! USB port 4 (OTG) setup
//!
//! Port 4 can be owned by the EHCI/OHCI host controllers or by the UDC
//! device controller, selected through the OTG port mux. Once the real
//! registers are programmed, the virtual UDC and OTG headers are hidden.

use super::config::SouthbridgeConfig;
use super::regs::*;
use crate::drivers::Result;
use crate::drivers::mmio::{MemorySpace, MmioWindow};
use crate::drivers::msr::MsrSpace;
use crate::drivers::pci::access::ConfigSpace;
use crate::drivers::pci::{DeviceHandle, DeviceId, DeviceLocator};

/// Memory BAR0 of a device, with the type bits stripped
///
/// `None` when resource allocation left the BAR unassigned; the caller
/// skips that device.
fn mmio_bar<C: ConfigSpace + ?Sized>(
    config: &mut C,
    id: DeviceId,
    dev: DeviceHandle,
) -> Result<Option<u64>> {
    let bar = (config.config_read32(dev, PCI_BASE_ADDRESS_0)? & !0xF) as u64;
    if bar == 0 {
        log::warn!("cs5536: {} at {} has no memory BAR, skipping", id, dev);
        return Ok(None);
    }
    Ok(Some(bar))
}

/// Configure the EHCI controller that shares port 4
fn ehci_init<H>(hw: &mut H, ehci: DeviceHandle) -> Result<()>
where
    H: MsrSpace + ConfigSpace + MemorySpace + ?Sized,
{
    // Serial short detect enable
    hw.modify_msr(USB2_SB_GLD_MSR_CONF, |mut msr| {
        msr.hi |= USB2_UPPER_SSDEN_SET;
        msr
    })?;

    // Write to clear the diag register
    let diag = hw.rdmsr(USB2_SB_GLD_MSR_DIAG)?;
    hw.wrmsr(USB2_SB_GLD_MSR_DIAG, diag)?;

    let Some(base) = mmio_bar(hw, CS5536_EHCI, ehci)? else {
        return Ok(());
    };

    // HCCPARAMS is read-only until IPREG04 unlocks it. The value written
    // differs from the silicon default and must be kept.
    let mut bar = MmioWindow::new(hw, base, EHCI_BAR_SIZE)?;
    bar.modify32(EHCI_IPREG04, |v| v | USB_HCCPW_SET)?;
    bar.write32(EHCI_HCCPARAMS, EHCI_HCCPARAMS_VALUE)?;
    Ok(())
}

/// Apply the USB port 4 configuration
pub fn enable_usb_port4<H>(hw: &mut H, sb: &SouthbridgeConfig) -> Result<()>
where
    H: MsrSpace + ConfigSpace + MemorySpace + DeviceLocator + ?Sized,
{
    match hw.find_device(CS5536_EHCI, 0) {
        Some(ehci) => ehci_init(hw, ehci)?,
        None => log::debug!("cs5536: EHCI {} not found, skipping", CS5536_EHCI),
    }

    let otg = hw.find_device(CS5536_OTG, 0);
    match otg {
        Some(otg) => {
            if let Some(base) = mmio_bar(hw, CS5536_OTG, otg)? {
                let mut bar = MmioWindow::new(hw, base, OTG_BAR_SIZE)?;
                let mux = if sb.enable_usbp4_device {
                    PMUX_DEVICE
                } else {
                    PMUX_HOST
                };
                bar.modify32(UOCMUX, |v| (v & PUEN_SET) | mux)?;

                if sb.enable_usbp4_overcurrent != 0 {
                    bar.modify32(UOCCAP, |v| v | sb.enable_usbp4_overcurrent)?;
                }
            }
        }
        None => log::debug!("cs5536: OTG {} not found, skipping", CS5536_OTG),
    }

    // Device mode: soft-disconnect the UDC until a gadget driver takes it,
    // and power the OTG pads
    let udc = hw.find_device(CS5536_UDC, 0);
    if sb.enable_usbp4_device {
        if let Some(udc) = udc {
            if let Some(base) = mmio_bar(hw, CS5536_UDC, udc)? {
                let mut bar = MmioWindow::new(hw, base, UDC_BAR_SIZE)?;
                bar.modify32(UDCDEVCTL, |v| v | UDC_SD_SET)?;
            }
        }

        if let Some(otg) = otg {
            if let Some(base) = mmio_bar(hw, CS5536_OTG, otg)? {
                let mut bar = MmioWindow::new(hw, base, OTG_BAR_SIZE)?;
                bar.modify32(UOCCTL, |v| v | PADEN_SET)?;
                bar.modify32(UOCCAP, |v| v | APU_SET)?;
            }
        }
    }

    // Hand the UDC and OTG over from the virtual PCI headers
    for dev in [udc, otg].into_iter().flatten() {
        hw.config_write32(dev, VPCI_DISABLE, VSA_MAGIC)?;
    }

    Ok(())
}
