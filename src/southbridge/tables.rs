//! Compiled-in MSR tables
//!
//! Each table is written verbatim, in order, up to the terminating entry
//! whose index is zero (no GeodeLink MSR lives at index 0).

use super::regs::*;
use crate::drivers::Result;
use crate::drivers::msr::{Msr, MsrSpace};

/// One MSR table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MsrInit {
    pub index: u32,
    pub msr: Msr,
}

impl MsrInit {
    pub const END: Self = Self::new(0, Msr::new(0, 0));

    pub const fn new(index: u32, msr: Msr) -> Self {
        Self { index, msr }
    }
}

/// Master configuration for the southbridge bus masters
pub static SB_MASTER_CONF_TABLE: &[MsrInit] = &[
    MsrInit::new(USB2_SB_GLD_MSR_CONF, Msr::lo(0x0008_F000)),
    MsrInit::new(ATA_SB_GLD_MSR_CONF, Msr::lo(0x0048_F000)),
    MsrInit::new(AC97_SB_GLD_MSR_CONF, Msr::lo(0x0008_F000)),
    MsrInit::new(MDD_SB_GLD_MSR_CONF, Msr::lo(0x0000_F000)),
    MsrInit::END,
];

/// Hardware clock gating
pub static CLOCK_GATING_TABLE: &[MsrInit] = &[
    MsrInit::new(GLIU_SB_GLD_MSR_PM, Msr::lo(0x0000_0004)),
    MsrInit::new(GLPCI_SB_GLD_MSR_PM, Msr::lo(0x0000_0005)),
    MsrInit::new(GLCP_SB_GLD_MSR_PM, Msr::lo(0x0000_0004)),
    // SMBus clock gating errata (PBZ 2226 & SiBZ 3977)
    MsrInit::new(MDD_SB_GLD_MSR_PM, Msr::lo(0x5055_4111)),
    MsrInit::new(ATA_SB_GLD_MSR_PM, Msr::lo(0x0000_0005)),
    MsrInit::new(AC97_SB_GLD_MSR_PM, Msr::lo(0x0000_0005)),
    MsrInit::END,
];

/// Write every entry before the terminator, in table order
///
/// Returns the number of MSRs written. A table without a terminator is
/// applied in full.
pub fn apply_table<M: MsrSpace + ?Sized>(msr: &mut M, table: &[MsrInit]) -> Result<usize> {
    let mut written = 0;
    for entry in table.iter().take_while(|entry| entry.index != 0) {
        msr.wrmsr(entry.index, entry.msr).inspect_err(|err| {
            log::error!("MSR({:#010X}, {}) write failed: {}", entry.index, entry.msr, err)
        })?;
        written += 1;
    }
    Ok(written)
}
