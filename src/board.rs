//! Real-hardware platform
//!
//! Wires the CPU register spaces, the CAM config mechanism and a scanned
//! device table into a [`Platform`] that the southbridge passes can run on.

use crate::drivers::Result;
use crate::drivers::mmio::{MemorySpace, PhysicalMemory};
use crate::drivers::msr::{CpuMsr, Msr, MsrSpace};
use crate::drivers::pci::access::{ConfigSpace, IoCamAccess};
use crate::drivers::pci::{DeviceHandle, DeviceId, DeviceLocator, DeviceTable};
use crate::drivers::port::{IoSpace, PortIo};
use crate::southbridge::Platform;
use crate::southbridge::config::SouthbridgeConfig;
use crate::southbridge::regs::CS5536_ISA;

/// POST code diagnostic port
const POST_PORT: u16 = 0x80;

/// Board-supplied routines the southbridge passes call out to
#[derive(Clone, Copy)]
pub struct BoardHooks {
    pub post_code: fn(u8),
    pub setup_interrupt_controller: fn(),
    pub rtc_init: fn(),
    pub isa_dma_init: fn(),
}

fn nop() {}

/// Write a POST code to port 0x80
pub fn port80_post_code(code: u8) {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    unsafe {
        crate::arch::io::outb(POST_PORT, code)
    };
    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    let _ = code;
}

impl Default for BoardHooks {
    fn default() -> Self {
        Self {
            post_code: port80_post_code,
            setup_interrupt_controller: nop,
            rtc_init: nop,
            isa_dma_init: nop,
        }
    }
}

/// Southbridge platform backed by the real CPU and bus 0
pub struct HardwarePlatform {
    msr: CpuMsr,
    io: PortIo,
    config: IoCamAccess,
    mem: PhysicalMemory,
    devices: DeviceTable,
    sb_config: SouthbridgeConfig,
    hooks: BoardHooks,
}

impl HardwarePlatform {
    /// Scan bus 0 and build a platform around what was found
    pub fn detect(sb_config: SouthbridgeConfig, hooks: BoardHooks) -> Result<Self> {
        let mut config = IoCamAccess;
        let devices = DeviceTable::scan_bus(&mut config, 0)?;
        Ok(Self::with_devices(devices, sb_config, hooks))
    }

    /// Build a platform around an already enumerated device table
    pub fn with_devices(
        devices: DeviceTable,
        sb_config: SouthbridgeConfig,
        hooks: BoardHooks,
    ) -> Self {
        Self {
            msr: CpuMsr,
            io: PortIo,
            config: IoCamAccess,
            mem: PhysicalMemory,
            devices,
            sb_config,
            hooks,
        }
    }

    pub fn devices(&self) -> &DeviceTable {
        &self.devices
    }
}

impl MsrSpace for HardwarePlatform {
    fn rdmsr(&mut self, index: u32) -> Result<Msr> {
        self.msr.rdmsr(index)
    }

    fn wrmsr(&mut self, index: u32, value: Msr) -> Result<()> {
        self.msr.wrmsr(index, value)
    }
}

impl ConfigSpace for HardwarePlatform {
    fn config_read32(&mut self, dev: DeviceHandle, offset: u8) -> Result<u32> {
        self.config.config_read32(dev, offset)
    }

    fn config_write32(&mut self, dev: DeviceHandle, offset: u8, value: u32) -> Result<()> {
        self.config.config_write32(dev, offset, value)
    }
}

impl IoSpace for HardwarePlatform {
    fn inl(&mut self, port: u16) -> Result<u32> {
        self.io.inl(port)
    }

    fn outl(&mut self, port: u16, value: u32) -> Result<()> {
        self.io.outl(port, value)
    }

    fn outw(&mut self, port: u16, value: u16) -> Result<()> {
        self.io.outw(port, value)
    }
}

impl MemorySpace for HardwarePlatform {
    fn mem_read32(&mut self, addr: u64) -> Result<u32> {
        self.mem.mem_read32(addr)
    }

    fn mem_write32(&mut self, addr: u64, value: u32) -> Result<()> {
        self.mem.mem_write32(addr, value)
    }
}

impl DeviceLocator for HardwarePlatform {
    fn find_device(&self, id: DeviceId, instance: usize) -> Option<DeviceHandle> {
        self.devices.find_device(id, instance)
    }
}

impl Platform for HardwarePlatform {
    fn device_config(&self, dev: DeviceHandle) -> Option<SouthbridgeConfig> {
        // The board configuration belongs to the ISA bridge function only
        self.devices
            .iter()
            .any(|d| d.id == CS5536_ISA && d.address == dev.address())
            .then_some(self.sb_config)
    }

    fn post_code(&mut self, code: u8) {
        (self.hooks.post_code)(code)
    }

    fn setup_interrupt_controller(&mut self) {
        (self.hooks.setup_interrupt_controller)()
    }

    fn rtc_init(&mut self) {
        (self.hooks.rtc_init)()
    }

    fn isa_dma_init(&mut self) {
        (self.hooks.isa_dma_init)()
    }
}
