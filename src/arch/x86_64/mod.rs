//! 64-bit x86 support
//!
//! Used when the crate is linked into an x86_64 payload.

pub mod io;
pub mod msr;
