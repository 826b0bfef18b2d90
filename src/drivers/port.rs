//! I/O Port Space
//!
//! Legacy, ACPI, GPIO and VSA virtual registers on the CS5536 are reached
//! through 16-bit I/O ports and have no device handle of their own.

use super::Result;

/// Access to the I/O port address space
pub trait IoSpace {
    /// Read a dword from `port`
    fn inl(&mut self, port: u16) -> Result<u32>;

    /// Write a dword to `port`
    fn outl(&mut self, port: u16, value: u32) -> Result<()>;

    /// Write a word to `port`
    fn outw(&mut self, port: u16, value: u16) -> Result<()>;
}

/// I/O space backed by the `in`/`out` instructions
pub struct PortIo;

impl IoSpace for PortIo {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    fn inl(&mut self, port: u16) -> Result<u32> {
        Ok(unsafe { crate::arch::io::inl(port) })
    }

    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    fn inl(&mut self, _port: u16) -> Result<u32> {
        Err(super::RegisterAccessError::Unavailable)
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    fn outl(&mut self, port: u16, value: u32) -> Result<()> {
        unsafe { crate::arch::io::outl(port, value) };
        Ok(())
    }

    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    fn outl(&mut self, _port: u16, _value: u32) -> Result<()> {
        Err(super::RegisterAccessError::Unavailable)
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    fn outw(&mut self, port: u16, value: u16) -> Result<()> {
        unsafe { crate::arch::io::outw(port, value) };
        Ok(())
    }

    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    fn outw(&mut self, _port: u16, _value: u16) -> Result<()> {
        Err(super::RegisterAccessError::Unavailable)
    }
}
