//! Regression probe: a failure raised inside the companion library must be
//! contained there and propagate across the C-ABI boundary as a status
//! code, not as an unwind into this binary.

use std::process::ExitCode;

use probekit_core::weak::{open_testlib, resolve_entry};
use probekit_probes::{fail, pass};

fn main() -> ExitCode {
    let lib = match open_testlib() {
        Ok(lib) => lib,
        Err(e) => return fail(&e.to_string()),
    };
    let raise = match resolve_entry(&lib, b"probekit_raise") {
        Ok(f) => f,
        Err(e) => return fail(&e.to_string()),
    };
    // SAFETY: probekit_raise is a no-argument status-returning export.
    let rc = unsafe { raise() };
    if rc == 0 {
        fail("library failure was not raised")
    } else {
        pass()
    }
}
