//! Raw port I/O for i586-class CPUs

/// Read a byte from an I/O port
///
/// # Safety
///
/// The port must be safe to read on this platform.
#[inline]
pub unsafe fn inb(port: u16) -> u8 {
    unsafe { ::x86::io::inb(port) }
}

/// Write a byte to an I/O port
///
/// # Safety
///
/// The port must be safe to write on this platform.
#[inline]
pub unsafe fn outb(port: u16, value: u8) {
    unsafe { ::x86::io::outb(port, value) }
}

/// # Safety
///
/// The port must be safe to write on this platform.
#[inline]
pub unsafe fn outw(port: u16, value: u16) {
    unsafe { ::x86::io::outw(port, value) }
}

/// # Safety
///
/// The port must be safe to read on this platform.
#[inline]
pub unsafe fn inl(port: u16) -> u32 {
    unsafe { ::x86::io::inl(port) }
}

/// # Safety
///
/// The port must be safe to write on this platform.
#[inline]
pub unsafe fn outl(port: u16, value: u32) {
    unsafe { ::x86::io::outl(port, value) }
}
