//! Raw x86 port I/O
//!
//! Thin wrappers around the `x86_64` crate's port types. Callers are expected
//! to go through [`crate::drivers::port::IoSpace`] instead of using these
//! directly, except for the console and POST port.

use x86_64::instructions::port::Port;

/// Read a byte from an I/O port
///
/// # Safety
///
/// The port must be safe to read on this platform.
#[inline]
pub unsafe fn inb(port: u16) -> u8 {
    unsafe { Port::<u8>::new(port).read() }
}

/// Write a byte to an I/O port
///
/// # Safety
///
/// The port must be safe to write on this platform.
#[inline]
pub unsafe fn outb(port: u16, value: u8) {
    unsafe { Port::<u8>::new(port).write(value) }
}

/// Write a word to an I/O port
///
/// # Safety
///
/// The port must be safe to write on this platform.
#[inline]
pub unsafe fn outw(port: u16, value: u16) {
    unsafe { Port::<u16>::new(port).write(value) }
}

/// Read a dword from an I/O port
///
/// # Safety
///
/// The port must be safe to read on this platform.
#[inline]
pub unsafe fn inl(port: u16) -> u32 {
    unsafe { Port::<u32>::new(port).read() }
}

/// Write a dword to an I/O port
///
/// # Safety
///
/// The port must be safe to write on this platform.
#[inline]
pub unsafe fn outl(port: u16, value: u32) {
    unsafe { Port::<u32>::new(port).write(value) }
}
