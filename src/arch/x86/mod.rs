//! 32-bit x86 support (Geode LX)

pub mod io;
pub mod msr;
