//! LPC bus, RTC and interrupt routing
//!
//! Sets up the "serial IRQ" (the LPC SERIRQ protocol, unrelated to the
//! UARTs), lets LPC devices do DMA, exposes the RTC alarm and century
//! registers, and routes PCI INTx through VSA.

use tock_registers::LocalRegisterCopy;

use super::Platform;
use super::config::SouthbridgeConfig;
use super::regs::*;
use crate::drivers::Result;
use crate::drivers::msr::{Msr, MsrSpace};
use crate::drivers::port::IoSpace;

/// LPC_SIRQ value for the configured polarity and mode, with SERIRQ enabled
pub fn serirq_control(sb: &SouthbridgeConfig) -> u32 {
    let mut sirq = LocalRegisterCopy::<u32, LPC_SIRQ::Register>::new(0);
    sirq.modify(
        LPC_SIRQ::INVERT.val(sb.lpc_serirq_polarity)
            + LPC_SIRQ::MODE.val(sb.lpc_serirq_mode)
            + LPC_SIRQ::ENABLE::SET,
    );
    sirq.get()
}

/// Standard init for the LPC bus
pub fn lpc_init<P: Platform + ?Sized>(hw: &mut P, sb: &SouthbridgeConfig) -> Result<()> {
    if sb.lpc_serirq_enable != 0 {
        hw.wrmsr(MDD_IRQM_LPC, Msr::lo(sb.lpc_serirq_enable))?;
        if sb.lpc_serirq_polarity != 0 {
            hw.wrmsr(MDD_LPC_SIRQ, Msr::lo(serirq_control(sb)))?;
        }
    }

    // Allow DMA from LPC
    set_low(hw, MDD_DMA_MAP, DMA_MAP_LPC)?;

    // RTC/CMOS century byte, day-of-month and month alarms
    set_low(hw, MDD_RTC_CENTURY_OFFSET, RTC_CENTURY)?;
    set_low(hw, MDD_RTC_DOMA_IND, RTC_DOMA)?;
    set_low(hw, MDD_RTC_MONA_IND, RTC_MONA)?;

    hw.rtc_init();
    hw.isa_dma_init();
    Ok(())
}

/// Replace the low dword of an MSR, keeping the high dword
fn set_low<M: MsrSpace + ?Sized>(msr: &mut M, index: u32, lo: u32) -> Result<()> {
    let mut value = msr.rdmsr(index)?;
    value.lo = lo;
    msr.wrmsr(index, value)
}

/// Write a VSA virtual register
pub fn vr_write<I: IoSpace + ?Sized>(io: &mut I, index: u16, data: u16) -> Result<()> {
    io.outl(VRC_INDEX, (VR_UNLOCK << 16) | index as u32)?;
    io.outw(VRC_DATA, data)
}

/// Route PCI INTA-D as requested by the board, if it asked for anything
pub fn gpio_int_route<I: IoSpace + ?Sized>(io: &mut I, route: u32) -> Result<()> {
    if route == 0 {
        return Ok(());
    }
    log::debug!("cs5536: PCI INT routing {:#010x}", route);
    vr_write(io, (VRC_MISCELLANEOUS << 8) + PCI_INT_AB, (route & 0xFFFF) as u16)?;
    vr_write(io, (VRC_MISCELLANEOUS << 8) + PCI_INT_CD, (route >> 16) as u16)
}
