//! PCI Configuration Space Access
//!
//! The CS5536 functions are reached through the legacy I/O Configuration
//! Access Mechanism (ports 0xCF8/0xCFC). Most of them are virtual headers
//! emulated by VSA, which traps these same ports, so ECAM is never used here.

use super::{DeviceHandle, PciAddress};
use crate::drivers::Result;

/// Trait for PCI configuration space access
///
/// Implementations provide read/write access to one device's configuration
/// registers, addressed by handle and byte offset.
pub trait ConfigSpace {
    /// Read a 32-bit value from configuration space
    fn config_read32(&mut self, dev: DeviceHandle, offset: u8) -> Result<u32>;

    /// Write a 32-bit value to configuration space
    fn config_write32(&mut self, dev: DeviceHandle, offset: u8, value: u32) -> Result<()>;

    /// Read a 16-bit value from configuration space
    fn config_read16(&mut self, dev: DeviceHandle, offset: u8) -> Result<u16> {
        let shift = (offset & 0x02) * 8;
        let value = self.config_read32(dev, offset & !0x3)?;
        Ok(((value >> shift) & 0xFFFF) as u16)
    }

    /// Read an 8-bit value from configuration space
    fn config_read8(&mut self, dev: DeviceHandle, offset: u8) -> Result<u8> {
        let shift = (offset & 0x03) * 8;
        let value = self.config_read32(dev, offset & !0x3)?;
        Ok(((value >> shift) & 0xFF) as u8)
    }
}

/// PCI configuration space ports (legacy CAM)
const PCI_CONFIG_ADDRESS: u16 = 0xCF8;
const PCI_CONFIG_DATA: u16 = 0xCFC;

/// Legacy I/O port-based PCI Configuration Access Mechanism
pub struct IoCamAccess;

impl IoCamAccess {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    fn read(addr: PciAddress, offset: u8) -> Result<u32> {
        use crate::arch::io::{inl, outl};

        unsafe {
            outl(PCI_CONFIG_ADDRESS, addr.cam_address(offset));
            Ok(inl(PCI_CONFIG_DATA))
        }
    }

    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    fn read(_addr: PciAddress, _offset: u8) -> Result<u32> {
        Err(crate::drivers::RegisterAccessError::Unavailable)
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    fn write(addr: PciAddress, offset: u8, value: u32) -> Result<()> {
        use crate::arch::io::outl;

        unsafe {
            outl(PCI_CONFIG_ADDRESS, addr.cam_address(offset));
            outl(PCI_CONFIG_DATA, value);
        }
        Ok(())
    }

    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    fn write(_addr: PciAddress, _offset: u8, _value: u32) -> Result<()> {
        Err(crate::drivers::RegisterAccessError::Unavailable)
    }
}

impl ConfigSpace for IoCamAccess {
    fn config_read32(&mut self, dev: DeviceHandle, offset: u8) -> Result<u32> {
        Self::read(dev.address(), offset)
    }

    fn config_write32(&mut self, dev: DeviceHandle, offset: u8, value: u32) -> Result<()> {
        Self::write(dev.address(), offset, value)
    }
}
