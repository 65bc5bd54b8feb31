//! Stack-alignment checks.
//!
//! Materializes stack locals with increasing alignment requirements and
//! verifies their addresses. The address is routed through `black_box` so
//! the optimizer cannot assume the pointer is aligned merely because the
//! type requires it. The per-width check functions are `inline(never)`;
//! if they were merged into one realigned frame nothing would be tested.

use std::hint::black_box;

#[derive(Default)]
#[repr(align(4))]
pub struct Align4 {
    _buf: [u8; 4],
}

#[derive(Default)]
#[repr(align(8))]
pub struct Align8 {
    _buf: [u8; 8],
}

#[derive(Default)]
#[repr(align(16))]
pub struct Align16 {
    _buf: [u8; 16],
}

#[derive(Default)]
#[repr(align(32))]
pub struct Align32 {
    _buf: [u8; 32],
}

fn check<T: Default>(context: &str, type_name: &str) -> bool {
    let t = T::default();
    let addr = black_box(std::ptr::from_ref(&t) as usize);
    let mask = std::mem::align_of::<T>() - 1;
    if addr & mask != 0 {
        eprintln!("ERROR: {context} {type_name}: address is not aligned: {addr:#x}");
        return false;
    }
    true
}

#[inline(never)]
pub fn check4(context: &str) -> bool {
    check::<Align4>(context, "Align4")
}

#[inline(never)]
pub fn check8(context: &str) -> bool {
    check::<Align8>(context, "Align8")
}

#[inline(never)]
pub fn check16(context: &str) -> bool {
    check::<Align16>(context, "Align16")
}

#[inline(never)]
pub fn check32(context: &str) -> bool {
    check::<Align32>(context, "Align32")
}

/// Run every per-width check; returns false if any local was misaligned.
pub fn run_all(context: &str) -> bool {
    // No short-circuit: report every misaligned width in one run.
    let mut ok = true;
    ok &= check4(context);
    ok &= check8(context);
    ok &= check16(context);
    ok &= check32(context);
    ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_locals_are_aligned_in_test_frames() {
        assert!(run_all("unit_test"));
    }

    #[test]
    fn stack_locals_are_aligned_in_spawned_thread() {
        let ok = std::thread::spawn(|| run_all("unit_test_thread"))
            .join()
            .expect("alignment thread panicked");
        assert!(ok);
    }
}
