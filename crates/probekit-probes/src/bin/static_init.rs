//! Regression probe: a process-global initializer with an observable side
//! effect must have run by the time main first consults the global it
//! initializes.

use std::process::ExitCode;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicBool, Ordering};

use probekit_probes::{fail, pass};

static CTOR_CALLED: AtomicBool = AtomicBool::new(false);

struct SideEffect;

impl SideEffect {
    fn new() -> Self {
        CTOR_CALLED.store(true, Ordering::SeqCst);
        SideEffect
    }
}

static GLOBAL: LazyLock<SideEffect> = LazyLock::new(SideEffect::new);

fn main() -> ExitCode {
    LazyLock::force(&GLOBAL);
    if CTOR_CALLED.load(Ordering::SeqCst) {
        pass()
    } else {
        fail("global initializer was not run before first use")
    }
}
