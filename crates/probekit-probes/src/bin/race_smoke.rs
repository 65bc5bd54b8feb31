//! Sanitizer trigger probe: two unsynchronized writers to one global.
//!
//! On an uninstrumented host the probe joins and exits 0. Under a race
//! detector the unordered write pair below is the expected trap; the
//! external harness asserts the detector's diagnostic, not this process's
//! own output. The race is the entire point — do not "fix" it.

use std::cell::UnsafeCell;
use std::process::ExitCode;
use std::thread;

use probekit_probes::{fail, pass};

struct RacyGlobal(UnsafeCell<i32>);

// SAFETY: deliberately unsound; this global exists to be raced on.
unsafe impl Sync for RacyGlobal {}

static GLOBAL: RacyGlobal = RacyGlobal(UnsafeCell::new(0));

fn main() -> ExitCode {
    let writer = thread::spawn(|| {
        // SAFETY: intentionally unsynchronized write, see module docs.
        unsafe { *GLOBAL.0.get() = 42 };
    });
    // SAFETY: the racing half of the pair.
    unsafe { *GLOBAL.0.get() = 43 };

    if writer.join().is_err() {
        return fail("writer thread panicked");
    }
    // SAFETY: the join synchronizes with the spawned writer.
    let value = unsafe { *GLOBAL.0.get() };
    if value == 42 || value == 43 {
        pass()
    } else {
        fail("global lost both writes")
    }
}
