//! Register spaces and device access
//!
//! The southbridge engine only talks to hardware through the traits defined
//! here ([`msr::MsrSpace`], [`pci::access::ConfigSpace`],
//! [`port::IoSpace`], [`mmio::MemorySpace`]) and the
//! [`pci::DeviceLocator`] lookup service.

pub mod mmio;
pub mod msr;
pub mod pci;
pub mod port;
pub mod serial;

/// Failure of the register transaction layer itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterAccessError {
    /// The register space cannot be reached on this platform
    Unavailable,
    /// An MMIO access fell outside the device's register window
    OutOfBounds { offset: u64, size: u64 },
}

impl core::fmt::Display for RegisterAccessError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "register space unavailable"),
            Self::OutOfBounds { offset, size } => write!(
                f,
                "MMIO access at {:#x} outside {:#x}-byte window",
                offset, size
            ),
        }
    }
}

/// Result type for register accesses
pub type Result<T> = core::result::Result<T, RegisterAccessError>;
