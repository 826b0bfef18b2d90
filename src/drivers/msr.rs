//! Model-Specific Register (MSR) Space
//!
//! GeodeLink devices expose their configuration as 64-bit MSRs that are
//! transferred as two 32-bit halves (EDX:EAX). [`Msr`] keeps the halves
//! together so callers always move both as one value.

use super::Result;

/// A 64-bit MSR value split into its high and low dwords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Msr {
    pub hi: u32,
    pub lo: u32,
}

impl Msr {
    pub const fn new(hi: u32, lo: u32) -> Self {
        Self { hi, lo }
    }

    /// Value with only the low dword set
    pub const fn lo(lo: u32) -> Self {
        Self { hi: 0, lo }
    }

    pub const fn as_u64(self) -> u64 {
        ((self.hi as u64) << 32) | (self.lo as u64)
    }
}

impl From<u64> for Msr {
    fn from(value: u64) -> Self {
        Self {
            hi: (value >> 32) as u32,
            lo: value as u32,
        }
    }
}

impl From<Msr> for u64 {
    fn from(msr: Msr) -> Self {
        msr.as_u64()
    }
}

impl core::fmt::Display for Msr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:08X}_{:08X}", self.hi, self.lo)
    }
}

/// Access to the MSR address space
///
/// No caching and no masking happens here: read-modify-write sequences are
/// the caller's job.
pub trait MsrSpace {
    /// Read the MSR at `index`
    fn rdmsr(&mut self, index: u32) -> Result<Msr>;

    /// Write `value` to the MSR at `index`
    fn wrmsr(&mut self, index: u32, value: Msr) -> Result<()>;

    /// Read, transform and write back one MSR
    fn modify_msr<F>(&mut self, index: u32, f: F) -> Result<Msr>
    where
        F: FnOnce(Msr) -> Msr,
    {
        let value = f(self.rdmsr(index)?);
        self.wrmsr(index, value)?;
        Ok(value)
    }
}

/// MSR space backed by the `rdmsr`/`wrmsr` instructions
pub struct CpuMsr;

impl MsrSpace for CpuMsr {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    fn rdmsr(&mut self, index: u32) -> Result<Msr> {
        // Safety: indices come from the compiled-in southbridge register map
        Ok(Msr::from(unsafe { crate::arch::msr::rdmsr(index) }))
    }

    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    fn rdmsr(&mut self, _index: u32) -> Result<Msr> {
        Err(super::RegisterAccessError::Unavailable)
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    fn wrmsr(&mut self, index: u32, value: Msr) -> Result<()> {
        unsafe { crate::arch::msr::wrmsr(index, value.as_u64()) };
        Ok(())
    }

    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    fn wrmsr(&mut self, _index: u32, _value: Msr) -> Result<()> {
        Err(super::RegisterAccessError::Unavailable)
    }
}
