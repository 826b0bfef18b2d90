//! GeodeLink MSR access on the Geode LX core

/// Read an MSR as a raw 64-bit value (EDX:EAX)
///
/// # Safety
///
/// `index` must name an MSR implemented by the CPU or routed to a
/// GeodeLink device; otherwise the instruction faults.
#[inline]
pub unsafe fn rdmsr(index: u32) -> u64 {
    unsafe { ::x86::msr::rdmsr(index) }
}

/// Write an MSR from a raw 64-bit value (EDX:EAX)
///
/// # Safety
///
/// Same requirements as [`rdmsr`].
#[inline]
pub unsafe fn wrmsr(index: u32, value: u64) {
    unsafe { ::x86::msr::wrmsr(index, value) }
}
