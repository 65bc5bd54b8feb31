//! Regression probe: a thread-local object's destructor must run exactly
//! once per thread and observe the values written before the backing
//! storage was deallocated.
//!
//! A worker thread paints a large thread-local slab; the slab's destructor
//! tramples freed heap memory and then verifies its own contents,
//! recording into a process-wide ledger checked after the join.

use std::cell::RefCell;
use std::process::ExitCode;
use std::thread;

use probekit_core::tls::{DtorLedger, TlsSlab};
use probekit_probes::{fail, pass};

static LEDGER: DtorLedger = DtorLedger::new();
const PATTERN: u8 = 7;

thread_local! {
    static SLAB: RefCell<TlsSlab> = RefCell::new(TlsSlab::new(PATTERN, &LEDGER));
}

fn main() -> ExitCode {
    let worker = thread::spawn(|| {
        SLAB.with(|slab| slab.borrow_mut().paint());
    });
    if worker.join().is_err() {
        return fail("probe thread panicked");
    }

    let (runs, corrupt) = LEDGER.snapshot();
    if runs != 1 {
        return fail(&format!("expected 1 destructor run, saw {runs}"));
    }
    if corrupt != 0 {
        return fail("destructor observed trampled thread-local contents");
    }
    pass()
}
