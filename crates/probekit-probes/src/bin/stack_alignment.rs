//! Regression probe: stack locals with 4/8/16/32-byte alignment
//! requirements must land on correctly aligned addresses, both on the
//! main thread and on a spawned thread. Misalignments are reported on
//! stderr and the probe exits 1.

use std::process::ExitCode;
use std::thread;

use probekit_core::align::run_all;
use probekit_probes::fail;

fn main() -> ExitCode {
    let mut ok = run_all("main");

    match thread::spawn(|| run_all("spawned_thread")).join() {
        Ok(thread_ok) => ok &= thread_ok,
        Err(_) => return fail("alignment thread panicked"),
    }

    if ok {
        ExitCode::SUCCESS
    } else {
        // Error lines were already printed per misaligned width.
        ExitCode::from(1)
    }
}
