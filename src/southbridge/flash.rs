//! Flash chip-select setup
//!
//! NAND/NOR parts hang off the IDE pins when a board has no disk. The
//! chip-select LBARs must be sized before VSA builds the flash PCI header,
//! and VSA is then told to expose that header in place of the IDE one.

use super::config::{FlashDevice, FlashInterface, FlashType};
use super::regs::*;
use crate::drivers::Result;
use crate::drivers::msr::MsrSpace;
use crate::drivers::pci::access::ConfigSpace;
use crate::drivers::pci::DeviceHandle;

/// High dword of a chip-select LBAR for `device`
///
/// The enable bit starts out clear; only type, interface and mask are set.
pub fn lbar_high(device: &FlashDevice) -> u32 {
    let mut hi = 0;
    if device.flash_type == FlashType::Nand {
        hi |= FLASH_LBAR_NAND;
    }
    if device.interface == FlashInterface::Memory {
        hi |= FLASH_LBAR_MEM;
    }
    hi | device.mask
}

/// Program the LBAR of every populated slot and write-enable it
///
/// Slots are handled in ascending order; slot `i` sets bit `i` of the
/// NOR flash control register. Returns the bits that were set.
pub fn chipset_flash_setup<M: MsrSpace + ?Sized>(
    msr: &mut M,
    table: &[FlashDevice; 4],
) -> Result<u32> {
    log::debug!("chipset_flash_setup: Start");
    let mut enabled = 0;

    for (i, device) in table.iter().enumerate() {
        if !device.is_present() {
            continue;
        }
        log::debug!("Enable CS{}", i);

        let port = MDD_LBAR_FLSH[i];
        let mut lbar = msr.rdmsr(port)?;
        lbar.hi = lbar_high(device);
        log::debug!("MSR({:#010X}, {})", port, lbar);
        msr.wrmsr(port, lbar)?;

        let mut norf = msr.rdmsr(MDD_NORF_CNTRL)?;
        norf.lo |= 1 << i;
        log::debug!("MSR({:#010X}, {})", MDD_NORF_CNTRL, norf);
        msr.wrmsr(MDD_NORF_CNTRL, norf)?;

        enabled |= 1 << i;
    }

    log::debug!("chipset_flash_setup: Finish");
    Ok(enabled)
}

/// Tell VSA to present the flash PCI header instead of the IDE header
pub fn enable_ide_nand_flash_header<C: ConfigSpace + ?Sized>(config: &mut C) -> Result<()> {
    config.config_write32(DeviceHandle::new(IDE_HEADER), IDE_FLASH_SWITCH, VSA_MAGIC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::msr::Msr;
    use crate::southbridge::config::{FLASH_INIT_TABLE, flash_mask};
    use crate::southbridge::testing::{Access, FakeBoard};

    const NAND_MEM_4K: FlashDevice = FlashDevice {
        flash_type: FlashType::Nand,
        interface: FlashInterface::Memory,
        mask: flash_mask::MEM_4K,
    };
    const NOR_IO_32B: FlashDevice = FlashDevice {
        flash_type: FlashType::Nor,
        interface: FlashInterface::Io,
        mask: flash_mask::IO_32B,
    };

    #[test]
    fn lbar_encodes_type_interface_and_mask() {
        assert_eq!(lbar_high(&NAND_MEM_4K), 0xFFFF_F006);
        assert_eq!(lbar_high(&NOR_IO_32B), 0x0000_FFE0);
    }

    #[test]
    fn default_table_enables_cs0_only() {
        let mut board = FakeBoard::new();
        board.set_msr(MDD_LBAR_FLSH[0], Msr::new(0x1234_0001, 0x0000_C000));

        assert_eq!(chipset_flash_setup(&mut board, &FLASH_INIT_TABLE).unwrap(), 0b1);
        // Low dword (base address) is preserved, high dword rebuilt
        assert_eq!(
            board.msr(MDD_LBAR_FLSH[0]),
            Msr::new(0xFFFF_F006, 0x0000_C000)
        );
        assert_eq!(board.msr(MDD_NORF_CNTRL).lo, 0b1);
        for port in &MDD_LBAR_FLSH[1..] {
            assert!(!board.msr_written(*port));
        }
    }

    #[test]
    fn each_slot_accumulates_its_own_bit() {
        let mut board = FakeBoard::new();
        let table = [NOR_IO_32B, FlashDevice::NONE, NAND_MEM_4K, NOR_IO_32B];

        assert_eq!(chipset_flash_setup(&mut board, &table).unwrap(), 0b1101);

        // One write-enable update per populated slot, bits added cumulatively
        let norf: Vec<u32> = board
            .msr_writes(MDD_NORF_CNTRL)
            .iter()
            .map(|m| m.lo)
            .collect();
        assert_eq!(norf, vec![0b0001, 0b0101, 0b1101]);
        assert!(!board.msr_written(MDD_LBAR_FLSH[1]));
    }

    #[test]
    fn slots_are_programmed_in_ascending_order() {
        let mut board = FakeBoard::new();
        let table = [NAND_MEM_4K, NAND_MEM_4K, FlashDevice::NONE, FlashDevice::NONE];
        chipset_flash_setup(&mut board, &table).unwrap();

        let lbars: Vec<u32> = board
            .writes()
            .iter()
            .filter_map(|a| match a {
                Access::Msr(i, _) if MDD_LBAR_FLSH.contains(i) => Some(*i),
                _ => None,
            })
            .collect();
        assert_eq!(lbars, vec![MDD_LBAR_FLSH[0], MDD_LBAR_FLSH[1]]);
    }

    #[test]
    fn empty_table_touches_nothing() {
        let mut board = FakeBoard::new();
        assert_eq!(chipset_flash_setup(&mut board, &[FlashDevice::NONE; 4]).unwrap(), 0);
        assert!(board.writes().is_empty());
    }

    #[test]
    fn header_swap_is_one_config_write() {
        let mut board = FakeBoard::new();
        enable_ide_nand_flash_header(&mut board).unwrap();
        assert_eq!(
            board.writes(),
            vec![Access::Config(IDE_HEADER, 0x40, 0xDEAD_BEEF)]
        );
    }
}
