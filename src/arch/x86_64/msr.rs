//! Model-specific register instructions

use x86_64::registers::model_specific::Msr;

/// Read an MSR as a raw 64-bit value (EDX:EAX)
///
/// # Safety
///
/// `index` must name an MSR implemented by the CPU or the GeodeLink
/// device it is routed to; otherwise the instruction faults.
#[inline]
pub unsafe fn rdmsr(index: u32) -> u64 {
    unsafe { Msr::new(index).read() }
}

/// Write an MSR from a raw 64-bit value (EDX:EAX)
///
/// # Safety
///
/// Same requirements as [`rdmsr`]; the write takes effect on chip state
/// immediately.
#[inline]
pub unsafe fn wrmsr(index: u32, value: u64) {
    unsafe { Msr::new(index).write(value) }
}
