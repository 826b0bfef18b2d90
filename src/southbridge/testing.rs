//! Recording fake of a CS5536 board for unit tests

use std::collections::BTreeMap;
use std::string::{String, ToString};
use std::vec::Vec;

use log::{LevelFilter, Log, Metadata, Record};

use super::Platform;
use super::config::SouthbridgeConfig;
use super::regs::*;
use crate::drivers::mmio::MemorySpace;
use crate::drivers::msr::{Msr, MsrSpace};
use crate::drivers::pci::access::ConfigSpace;
use crate::drivers::pci::{DeviceHandle, DeviceId, DeviceLocator, PciAddress};
use crate::drivers::port::IoSpace;
use crate::drivers::{RegisterAccessError, Result};

pub const ISA_ADDR: PciAddress = PciAddress::new(0, 0x0f, 0);
pub const EHCI_ADDR: PciAddress = PciAddress::new(0, 0x0f, 5);
pub const UDC_ADDR: PciAddress = PciAddress::new(0, 0x0f, 6);
pub const OTG_ADDR: PciAddress = PciAddress::new(0, 0x0f, 7);

pub const GPIO_BASE: u16 = 0x6100;
pub const EHCI_BAR: u64 = 0xFE01_0000;
pub const UDC_BAR: u64 = 0xFE02_0000;
pub const OTG_BAR: u64 = 0xFE03_0000;

/// Every log line emitted by any test, in arrival order
static CAPTURED: spin::Mutex<Vec<String>> = spin::Mutex::new(Vec::new());

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        CAPTURED.lock().push(record.args().to_string());
    }

    fn flush(&self) {}
}

static CAPTURE: CaptureLogger = CaptureLogger;

/// Route `log` output into the capture buffer
///
/// Tests share one buffer, so assertions should look for lines only their
/// own scenario can produce.
pub fn capture_logs() {
    let _ = log::set_logger(&CAPTURE);
    log::set_max_level(LevelFilter::Trace);
}

/// Whether any captured line contains `needle`
pub fn logged(needle: &str) -> bool {
    CAPTURED.lock().iter().any(|line| line.contains(needle))
}

/// One side effect on the board, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Msr(u32, Msr),
    Config(PciAddress, u8, u32),
    Io32(u16, u32),
    Io16(u16, u16),
    Mem(u64, u32),
    PostCode(u8),
    Hook(&'static str),
}

pub struct FakeBoard {
    msrs: BTreeMap<u32, Msr>,
    config: BTreeMap<(PciAddress, u8), u32>,
    io: BTreeMap<u16, u32>,
    mem: BTreeMap<u64, u32>,
    devices: Vec<(DeviceId, PciAddress)>,
    sb_config: Option<SouthbridgeConfig>,
    log: Vec<Access>,
    msr_unavailable: bool,
    mem_unavailable: bool,
}

impl FakeBoard {
    /// Empty board: no devices, every register reads zero
    pub fn new() -> Self {
        Self {
            msrs: BTreeMap::new(),
            config: BTreeMap::new(),
            io: BTreeMap::new(),
            mem: BTreeMap::new(),
            devices: Vec::new(),
            sb_config: None,
            log: Vec::new(),
            msr_unavailable: false,
            mem_unavailable: false,
        }
    }

    /// Board with the ISA bridge and all three USB functions present
    pub fn cs5536(config: SouthbridgeConfig) -> Self {
        let mut board = Self::new();
        board.add_device(CS5536_ISA, ISA_ADDR);
        board.set_config(ISA_ADDR, PCI_BASE_ADDRESS_1, GPIO_BASE as u32 | 1);
        board.add_device(CS5536_EHCI, EHCI_ADDR);
        board.set_config(EHCI_ADDR, PCI_BASE_ADDRESS_0, EHCI_BAR as u32);
        board.add_device(CS5536_UDC, UDC_ADDR);
        board.set_config(UDC_ADDR, PCI_BASE_ADDRESS_0, UDC_BAR as u32);
        board.add_device(CS5536_OTG, OTG_ADDR);
        board.set_config(OTG_ADDR, PCI_BASE_ADDRESS_0, OTG_BAR as u32);
        board.sb_config = Some(config);
        board
    }

    pub fn add_device(&mut self, id: DeviceId, address: PciAddress) {
        self.devices.push((id, address));
    }

    pub fn remove_device(&mut self, id: DeviceId) {
        self.devices.retain(|(dev, _)| *dev != id);
    }

    pub fn clear_config(&mut self) {
        self.sb_config = None;
    }

    /// Preload a register without logging it
    pub fn set_msr(&mut self, index: u32, value: Msr) {
        self.msrs.insert(index, value);
    }

    pub fn set_config(&mut self, address: PciAddress, offset: u8, value: u32) {
        self.config.insert((address, offset), value);
    }

    pub fn set_mem(&mut self, addr: u64, value: u32) {
        self.mem.insert(addr, value);
    }

    /// Make every MSR access fail
    pub fn fail_msr(&mut self) {
        self.msr_unavailable = true;
    }

    /// Make every MMIO access fail
    pub fn fail_mem(&mut self) {
        self.mem_unavailable = true;
    }

    pub fn msr(&self, index: u32) -> Msr {
        self.msrs.get(&index).copied().unwrap_or_default()
    }

    pub fn config(&self, address: PciAddress, offset: u8) -> u32 {
        self.config.get(&(address, offset)).copied().unwrap_or(0)
    }

    pub fn io(&self, port: u16) -> u32 {
        self.io.get(&port).copied().unwrap_or(0)
    }

    pub fn mem(&self, addr: u64) -> u32 {
        self.mem.get(&addr).copied().unwrap_or(0)
    }

    pub fn writes(&self) -> Vec<Access> {
        self.log.clone()
    }

    pub fn msr_writes(&self, index: u32) -> Vec<Msr> {
        self.log
            .iter()
            .filter_map(|access| match access {
                Access::Msr(i, value) if *i == index => Some(*value),
                _ => None,
            })
            .collect()
    }

    pub fn msr_written(&self, index: u32) -> bool {
        !self.msr_writes(index).is_empty()
    }

    pub fn count(&self, access: &Access) -> usize {
        self.log.iter().filter(|a| *a == access).count()
    }

    /// Final state of every register space, for whole-board comparisons
    #[allow(clippy::type_complexity)]
    pub fn state(
        &self,
    ) -> (
        BTreeMap<u32, Msr>,
        BTreeMap<(PciAddress, u8), u32>,
        BTreeMap<u16, u32>,
        BTreeMap<u64, u32>,
    ) {
        (
            self.msrs.clone(),
            self.config.clone(),
            self.io.clone(),
            self.mem.clone(),
        )
    }
}

impl MsrSpace for FakeBoard {
    fn rdmsr(&mut self, index: u32) -> Result<Msr> {
        if self.msr_unavailable {
            return Err(RegisterAccessError::Unavailable);
        }
        Ok(self.msr(index))
    }

    fn wrmsr(&mut self, index: u32, value: Msr) -> Result<()> {
        if self.msr_unavailable {
            return Err(RegisterAccessError::Unavailable);
        }
        self.msrs.insert(index, value);
        self.log.push(Access::Msr(index, value));
        Ok(())
    }
}

impl ConfigSpace for FakeBoard {
    fn config_read32(&mut self, dev: DeviceHandle, offset: u8) -> Result<u32> {
        Ok(self.config(dev.address(), offset))
    }

    fn config_write32(&mut self, dev: DeviceHandle, offset: u8, value: u32) -> Result<()> {
        self.config.insert((dev.address(), offset), value);
        self.log.push(Access::Config(dev.address(), offset, value));
        Ok(())
    }
}

impl IoSpace for FakeBoard {
    fn inl(&mut self, port: u16) -> Result<u32> {
        Ok(self.io(port))
    }

    fn outl(&mut self, port: u16, value: u32) -> Result<()> {
        self.io.insert(port, value);
        self.log.push(Access::Io32(port, value));
        Ok(())
    }

    fn outw(&mut self, port: u16, value: u16) -> Result<()> {
        self.io.insert(port, value as u32);
        self.log.push(Access::Io16(port, value));
        Ok(())
    }
}

impl MemorySpace for FakeBoard {
    fn mem_read32(&mut self, addr: u64) -> Result<u32> {
        if self.mem_unavailable {
            return Err(RegisterAccessError::Unavailable);
        }
        Ok(self.mem(addr))
    }

    fn mem_write32(&mut self, addr: u64, value: u32) -> Result<()> {
        if self.mem_unavailable {
            return Err(RegisterAccessError::Unavailable);
        }
        self.mem.insert(addr, value);
        self.log.push(Access::Mem(addr, value));
        Ok(())
    }
}

impl DeviceLocator for FakeBoard {
    fn find_device(&self, id: DeviceId, instance: usize) -> Option<DeviceHandle> {
        self.devices
            .iter()
            .filter(|(dev, _)| *dev == id)
            .nth(instance)
            .map(|(_, address)| DeviceHandle::new(*address))
    }
}

impl Platform for FakeBoard {
    fn device_config(&self, _dev: DeviceHandle) -> Option<SouthbridgeConfig> {
        self.sb_config
    }

    fn post_code(&mut self, code: u8) {
        self.log.push(Access::PostCode(code));
    }

    fn setup_interrupt_controller(&mut self) {
        self.log.push(Access::Hook("setup_interrupt_controller"));
    }

    fn rtc_init(&mut self) {
        self.log.push(Access::Hook("rtc_init"));
    }

    fn isa_dma_init(&mut self) {
        self.log.push(Access::Hook("isa_dma_init"));
    }
}
