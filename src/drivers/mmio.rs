//! Memory-Mapped I/O (MMIO) Register Abstraction
//!
//! Device BARs are accessed through [`MmioWindow`], which keys every access by
//! a byte offset into the BAR and checks it against the region size before
//! touching memory. The backing [`MemorySpace`] does the actual volatile
//! access, so no caller ever computes a raw register pointer.
//!
//! # Example
//!
//! ```rust,ignore
//! use cs5536::drivers::mmio::{MmioWindow, PhysicalMemory};
//!
//! let mut mem = PhysicalMemory;
//! let mut bar = MmioWindow::new(&mut mem, 0xFE01_0000, 0x1000)?;
//! bar.modify32(0xA0, |v| v | (1 << 1))?;
//! bar.write32(0x08, 0x0000_5012)?;
//! ```

use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::ReadWrite;

use super::{RegisterAccessError, Result};

/// Access to physical memory for MMIO registers
pub trait MemorySpace {
    /// Read a 32-bit register at physical address `addr`
    fn mem_read32(&mut self, addr: u64) -> Result<u32>;

    /// Write a 32-bit register at physical address `addr`
    fn mem_write32(&mut self, addr: u64, value: u32) -> Result<()>;
}

/// Identity-mapped physical memory
///
/// Coreboot stages run with paging off (or identity mapped), so a BAR
/// address is directly dereferenceable.
pub struct PhysicalMemory;

impl PhysicalMemory {
    fn register(addr: u64) -> Result<&'static ReadWrite<u32>> {
        if addr == 0 || addr % 4 != 0 {
            return Err(RegisterAccessError::Unavailable);
        }
        // Safety: non-null, aligned, and only produced from a bounds-checked
        // MmioWindow over a BAR assigned during resource allocation
        Ok(unsafe { &*(addr as usize as *const ReadWrite<u32>) })
    }
}

impl MemorySpace for PhysicalMemory {
    fn mem_read32(&mut self, addr: u64) -> Result<u32> {
        Ok(Self::register(addr)?.get())
    }

    fn mem_write32(&mut self, addr: u64, value: u32) -> Result<()> {
        Self::register(addr)?.set(value);
        Ok(())
    }
}

/// A bounds-checked view of one device's MMIO BAR
pub struct MmioWindow<'a, M: MemorySpace + ?Sized> {
    mem: &'a mut M,
    /// Base address of the BAR
    base: u64,
    /// Size of the BAR in bytes
    size: u64,
}

impl<'a, M: MemorySpace + ?Sized> MmioWindow<'a, M> {
    /// Create a window over `[base, base + size)`
    ///
    /// An unassigned (zero) BAR means the device has no usable MMIO space.
    pub fn new(mem: &'a mut M, base: u64, size: u64) -> Result<Self> {
        if base == 0 {
            return Err(RegisterAccessError::Unavailable);
        }
        Ok(Self { mem, base, size })
    }

    fn check_bounds(&self, offset: u64, access_size: u64) -> Result<()> {
        match offset.checked_add(access_size) {
            Some(end) if end <= self.size => Ok(()),
            _ => Err(RegisterAccessError::OutOfBounds {
                offset,
                size: self.size,
            }),
        }
    }

    /// Read a 32-bit register at the given offset.
    pub fn read32(&mut self, offset: u64) -> Result<u32> {
        self.check_bounds(offset, 4)?;
        self.mem.mem_read32(self.base + offset)
    }

    /// Write a 32-bit register at the given offset.
    pub fn write32(&mut self, offset: u64, value: u32) -> Result<()> {
        self.check_bounds(offset, 4)?;
        self.mem.mem_write32(self.base + offset, value)
    }

    /// Read-modify-write a 32-bit register at the given offset, returning
    /// the value written.
    pub fn modify32<F>(&mut self, offset: u64, f: F) -> Result<u32>
    where
        F: FnOnce(u32) -> u32,
    {
        let value = f(self.read32(offset)?);
        self.write32(offset, value)?;
        Ok(value)
    }
}

impl<M: MemorySpace + ?Sized> core::fmt::Debug for MmioWindow<'_, M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MmioWindow")
            .field("base", &format_args!("{:#x}", self.base))
            .field("size", &format_args!("{:#x}", self.size))
            .finish()
    }
}
