//! Regression probe: a worker thread loads the companion library, touches
//! a thread-local it owns, and unloads it again before exiting. Pass is
//! simply surviving the sequence and exiting zero.

use std::process::ExitCode;
use std::thread;

use probekit_core::weak::{open_testlib, resolve_entry};
use probekit_probes::{fail, pass};

fn main() -> ExitCode {
    let joined = thread::spawn(|| -> Result<(), String> {
        let lib = open_testlib().map_err(|e| e.to_string())?;
        let touch = resolve_entry(&lib, b"probekit_touch_tls").map_err(|e| e.to_string())?;
        // SAFETY: probekit_touch_tls is a no-argument status-returning export.
        unsafe { touch() };
        drop(lib);
        Ok(())
    })
    .join();

    match joined {
        Err(_) => fail("probe thread panicked"),
        Ok(Err(msg)) => fail(&msg),
        Ok(Ok(())) => pass(),
    }
}
