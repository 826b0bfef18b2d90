//! Architecture-specific support
//!
//! Geode LX boards run the 32-bit backend; 64-bit payload builds use the
//! `x86_64` one. Both expose the same `io` and `msr` functions.

#[cfg(target_arch = "x86")]
pub mod x86;
#[cfg(target_arch = "x86_64")]
pub mod x86_64;

#[cfg(target_arch = "x86")]
pub use self::x86::{io, msr};
#[cfg(target_arch = "x86_64")]
pub use self::x86_64::{io, msr};
